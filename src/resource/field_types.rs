//! Convenience constructors for common column types.

use super::property::Field;
use crate::model::schema::SqlType;

impl Field {
    pub fn integer() -> Self {
        Field::of(SqlType::Integer)
    }

    pub fn big_integer() -> Self {
        Field::of(SqlType::BigInteger)
    }

    pub fn small_integer() -> Self {
        Field::of(SqlType::SmallInteger)
    }

    pub fn float() -> Self {
        Field::of(SqlType::Float)
    }

    pub fn numeric(precision: u32, scale: u32) -> Self {
        Field::of(SqlType::Numeric { precision, scale })
    }

    pub fn string(length: Option<u32>) -> Self {
        Field::of(SqlType::String(length))
    }

    pub fn text() -> Self {
        Field::of(SqlType::Text)
    }

    pub fn boolean() -> Self {
        Field::of(SqlType::Boolean)
    }

    pub fn date() -> Self {
        Field::of(SqlType::Date)
    }

    pub fn date_time() -> Self {
        Field::of(SqlType::DateTime)
    }

    pub fn binary() -> Self {
        Field::of(SqlType::Binary)
    }
}
