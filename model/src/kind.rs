use hbnb_error::{Error, Result};
use strum_macros::EnumIter;

/// Registry of concrete model classes.
///
/// The serialized `__class__` marker is resolved here, never by the model
/// itself.
#[derive(EnumIter, Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum ModelKind {
    BaseModel,
    User,
    State,
    City,
    Amenity,
    Place,
    Review,
}

impl ModelKind {
    pub fn to_str(&self) -> &'static str {
        match self {
            Self::BaseModel => "BaseModel",
            Self::User => "User",
            Self::State => "State",
            Self::City => "City",
            Self::Amenity => "Amenity",
            Self::Place => "Place",
            Self::Review => "Review",
        }
    }

    pub fn from_str(str: &str) -> Result<Self> {
        match str {
            "BaseModel" => Ok(Self::BaseModel),
            "User" => Ok(Self::User),
            "State" => Ok(Self::State),
            "City" => Ok(Self::City),
            "Amenity" => Ok(Self::Amenity),
            "Place" => Ok(Self::Place),
            "Review" => Ok(Self::Review),
            _ => Err(Error::UnknownClass(str.to_owned())),
        }
    }

    pub fn table_name(&self) -> &'static str {
        match self {
            Self::BaseModel => "base_models",
            Self::User => "users",
            Self::State => "states",
            Self::City => "cities",
            Self::Amenity => "amenities",
            Self::Place => "places",
            Self::Review => "reviews",
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn class_names_resolve_back() {
        for kind in ModelKind::iter() {
            assert_eq!(ModelKind::from_str(kind.to_str()).unwrap(), kind);
        }
    }

    #[test]
    fn table_names_are_distinct() {
        let mut tables = ModelKind::iter().map(|kind| kind.table_name()).collect::<Vec<_>>();
        tables.sort_unstable();
        tables.dedup();
        assert_eq!(tables.len(), ModelKind::iter().count());
    }

    #[test]
    fn unknown_class_is_rejected() {
        assert!(matches!(
            ModelKind::from_str("Booking"),
            Err(Error::UnknownClass(name)) if name == "Booking"
        ));
    }
}
