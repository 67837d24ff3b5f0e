//! Canonical land-cover class scheme.
//!
//! Class ids are the reclassified codes produced upstream; id 0 is nodata and
//! never a member of a scheme. Ids must stay below 100 so that a transition
//! pair packs into a single base-100 key (see [`crate::transition`]).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{IntensityError, Result};

/// Nodata / masked pixel value. Never a scheme member.
pub const NODATA: u8 = 0;

/// Exclusive upper bound on class ids imposed by the base-100 key packing.
pub const MAX_CLASS_ID: u8 = 100;

/// Stable identifier of a land-cover class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(pub u8);

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One category of the scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandCoverClass {
    pub id: ClassId,
    pub name: String,
}

/// Ordered, immutable set of land-cover categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LandCoverClass>", into = "Vec<LandCoverClass>")]
pub struct ClassScheme {
    classes: Vec<LandCoverClass>,
}

/// Reference scheme: GLC-FCS30D codes collapsed into ten categories.
const REFERENCE_CLASSES: [(u8, &str); 10] = [
    (1, "Cropland"),
    (2, "Forest"),
    (3, "Shrubland"),
    (4, "Grassland"),
    (5, "Tundra"),
    (6, "Wetland"),
    (7, "Impervious"),
    (8, "Bare"),
    (9, "Water"),
    (10, "Snow/Ice"),
];

impl ClassScheme {
    /// Build a scheme, rejecting nodata, out-of-range, duplicate ids and blank names.
    pub fn new(classes: Vec<LandCoverClass>) -> Result<Self> {
        if classes.is_empty() {
            return Err(IntensityError::InvalidClassScheme("scheme has no classes".into()));
        }
        for (i, class) in classes.iter().enumerate() {
            if class.id.0 == NODATA {
                return Err(IntensityError::InvalidClassScheme(format!(
                    "class {:?} uses the nodata id 0",
                    class.name
                )));
            }
            if class.id.0 >= MAX_CLASS_ID {
                return Err(IntensityError::InvalidClassScheme(format!(
                    "class id {} does not fit the base-100 transition key",
                    class.id
                )));
            }
            if class.name.trim().is_empty() {
                return Err(IntensityError::InvalidClassScheme(format!(
                    "class {} has an empty name",
                    class.id
                )));
            }
            if classes[..i].iter().any(|c| c.id == class.id) {
                return Err(IntensityError::InvalidClassScheme(format!(
                    "duplicate class id {}",
                    class.id
                )));
            }
        }
        Ok(Self { classes })
    }

    /// The ten-class reference scheme.
    pub fn reference() -> Self {
        Self {
            classes: REFERENCE_CLASSES
                .iter()
                .map(|&(id, name)| LandCoverClass { id: ClassId(id), name: name.to_string() })
                .collect(),
        }
    }

    pub fn classes(&self) -> &[LandCoverClass] {
        &self.classes
    }

    pub fn ids(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.classes.iter().map(|c| c.id)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn contains(&self, id: ClassId) -> bool {
        self.classes.iter().any(|c| c.id == id)
    }

    /// Name of `id`, or `None` when it is not a member.
    pub fn name(&self, id: ClassId) -> Option<&str> {
        self.classes.iter().find(|c| c.id == id).map(|c| c.name.as_str())
    }

    /// Position of `id` in scheme order.
    pub fn index_of(&self, id: ClassId) -> Option<usize> {
        self.classes.iter().position(|c| c.id == id)
    }
}

impl Default for ClassScheme {
    fn default() -> Self {
        Self::reference()
    }
}

impl TryFrom<Vec<LandCoverClass>> for ClassScheme {
    type Error = IntensityError;

    fn try_from(classes: Vec<LandCoverClass>) -> Result<Self> {
        Self::new(classes)
    }
}

impl From<ClassScheme> for Vec<LandCoverClass> {
    fn from(scheme: ClassScheme) -> Self {
        scheme.classes
    }
}
