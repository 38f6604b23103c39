use {
    crate::decimal,
    bigdecimal::BigDecimal,
    serde::{
        Deserializer,
        Serializer,
        de::{self, Visitor},
    },
    serde_with::{DeserializeAs, SerializeAs},
    std::fmt,
};

/// Serialize [`BigDecimal`] as a plain decimal string and deserialize it from
/// a decimal string or an integer.
///
/// Floating point JSON numbers are rejected to keep amounts exact.
pub struct DecimalString;

impl SerializeAs<BigDecimal> for DecimalString {
    fn serialize_as<S: Serializer>(source: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&decimal::format(source))
    }
}

impl<'de> DeserializeAs<'de, BigDecimal> for DecimalString {
    fn deserialize_as<D>(deserializer: D) -> Result<BigDecimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DecimalVisitor;

        impl Visitor<'_> for DecimalVisitor {
            type Value = BigDecimal;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "a decimal encoded as a string or an integer")
            }

            fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                decimal::parse(s).map_err(|err| E::custom(format!("{err:#}")))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(BigDecimal::from(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(BigDecimal::from(v))
            }
        }

        deserializer.deserialize_any(DecimalVisitor)
    }
}
