// ABOUTME: Conversion of native Rust values into protobuf well-known Value types.
// ABOUTME: Typed ToGrpcValue trait, a runtime-typed to_value fallback, and JSON decoding.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};

use prost_types::value::Kind;
use prost_types::{ListValue, NullValue, Struct, Value};
use thiserror::Error;

/// Errors raised when a payload cannot be represented as a `Value`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// The payload's runtime type has no `Value` representation.
    #[error("payload is not supported by to_value, implement ToGrpcValue for it")]
    Unsupported,

    /// An element inside a sequence could not be converted.
    #[error("element {index} of sequence: {source}")]
    UnsupportedElement {
        index: usize,
        #[source]
        source: Box<ValueError>,
    },
}

/// Types that can be turned into a protobuf `Value`.
///
/// Implement this for your own types to make them serializable; build a
/// `Struct` from the fields and wrap it with [`Struct::to_grpc_value`].
pub trait ToGrpcValue {
    fn to_grpc_value(&self) -> Value;
}

fn from_kind(kind: Kind) -> Value {
    Value { kind: Some(kind) }
}

/// The null `Value`.
pub fn null_value() -> Value {
    from_kind(Kind::NullValue(NullValue::NullValue as i32))
}

impl ToGrpcValue for str {
    fn to_grpc_value(&self) -> Value {
        from_kind(Kind::StringValue(self.to_owned()))
    }
}

impl ToGrpcValue for String {
    fn to_grpc_value(&self) -> Value {
        self.as_str().to_grpc_value()
    }
}

impl ToGrpcValue for bool {
    fn to_grpc_value(&self) -> Value {
        from_kind(Kind::BoolValue(*self))
    }
}

// Numbers travel as IEEE-754 doubles; 64-bit integers above 2^53 lose precision.
macro_rules! impl_number {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ToGrpcValue for $ty {
                fn to_grpc_value(&self) -> Value {
                    from_kind(Kind::NumberValue(*self as f64))
                }
            }
        )+
    };
}

impl_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl ToGrpcValue for () {
    fn to_grpc_value(&self) -> Value {
        null_value()
    }
}

impl<T: ToGrpcValue + ?Sized> ToGrpcValue for &T {
    fn to_grpc_value(&self) -> Value {
        (**self).to_grpc_value()
    }
}

impl<T: ToGrpcValue + ?Sized> ToGrpcValue for Box<T> {
    fn to_grpc_value(&self) -> Value {
        (**self).to_grpc_value()
    }
}

impl<T: ToGrpcValue> ToGrpcValue for Option<T> {
    fn to_grpc_value(&self) -> Value {
        match self {
            Some(value) => value.to_grpc_value(),
            None => null_value(),
        }
    }
}

impl<T: ToGrpcValue> ToGrpcValue for [T] {
    fn to_grpc_value(&self) -> Value {
        from_kind(Kind::ListValue(ListValue {
            values: self.iter().map(ToGrpcValue::to_grpc_value).collect(),
        }))
    }
}

impl<T: ToGrpcValue> ToGrpcValue for Vec<T> {
    fn to_grpc_value(&self) -> Value {
        self.as_slice().to_grpc_value()
    }
}

impl<T: ToGrpcValue, const N: usize> ToGrpcValue for [T; N] {
    fn to_grpc_value(&self) -> Value {
        self.as_slice().to_grpc_value()
    }
}

impl<V: ToGrpcValue> ToGrpcValue for BTreeMap<String, V> {
    fn to_grpc_value(&self) -> Value {
        from_kind(Kind::StructValue(Struct {
            fields: self
                .iter()
                .map(|(k, v)| (k.clone(), v.to_grpc_value()))
                .collect(),
        }))
    }
}

impl<V: ToGrpcValue, S> ToGrpcValue for HashMap<String, V, S> {
    fn to_grpc_value(&self) -> Value {
        from_kind(Kind::StructValue(Struct {
            fields: self
                .iter()
                .map(|(k, v)| (k.clone(), v.to_grpc_value()))
                .collect(),
        }))
    }
}

impl ToGrpcValue for Value {
    fn to_grpc_value(&self) -> Value {
        self.clone()
    }
}

impl ToGrpcValue for ListValue {
    fn to_grpc_value(&self) -> Value {
        from_kind(Kind::ListValue(self.clone()))
    }
}

impl ToGrpcValue for Struct {
    fn to_grpc_value(&self) -> Value {
        from_kind(Kind::StructValue(self.clone()))
    }
}

impl ToGrpcValue for serde_json::Value {
    fn to_grpc_value(&self) -> Value {
        match self {
            serde_json::Value::Null => null_value(),
            serde_json::Value::Bool(v) => v.to_grpc_value(),
            serde_json::Value::Number(n) => {
                from_kind(Kind::NumberValue(n.as_f64().unwrap_or_default()))
            }
            serde_json::Value::String(s) => s.to_grpc_value(),
            serde_json::Value::Array(arr) => arr.to_grpc_value(),
            serde_json::Value::Object(obj) => from_kind(Kind::StructValue(Struct {
                fields: obj
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_grpc_value()))
                    .collect(),
            })),
        }
    }
}

macro_rules! try_downcast {
    ($payload:expr, $($ty:ty),+ $(,)?) => {
        $(
            if let Some(value) = $payload.downcast_ref::<$ty>() {
                return Ok(value.to_grpc_value());
            }
        )+
    };
}

/// Convert a payload whose type is only known at runtime.
///
/// Supports the scalar kinds, `()` and `None` of an optional scalar as null,
/// protobuf values, JSON values, homogeneous vectors of scalars and
/// heterogeneous `Vec<Box<dyn Any>>` sequences. Anything else is rejected
/// with [`ValueError::Unsupported`].
pub fn to_value(payload: &dyn Any) -> Result<Value, ValueError> {
    try_downcast!(
        payload,
        String,
        &'static str,
        bool,
        i8,
        i16,
        i32,
        i64,
        isize,
        u8,
        u16,
        u32,
        u64,
        usize,
        f32,
        f64,
        (),
        Value,
        ListValue,
        Struct,
        serde_json::Value,
        Vec<String>,
        Vec<&'static str>,
        Vec<bool>,
        Vec<i32>,
        Vec<i64>,
        Vec<u64>,
        Vec<f64>,
        Vec<Value>,
        Option<String>,
        Option<&'static str>,
        Option<bool>,
        Option<i32>,
        Option<i64>,
        Option<u64>,
        Option<f64>,
    );

    if let Some(items) = payload.downcast_ref::<Vec<Box<dyn Any>>>() {
        let values = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                to_value(item.as_ref()).map_err(|e| ValueError::UnsupportedElement {
                    index,
                    source: Box::new(e),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(from_kind(Kind::ListValue(ListValue { values })));
    }

    Err(ValueError::Unsupported)
}

/// Decode a `Value` back into JSON.
///
/// Non-finite numbers have no JSON form and decode as null.
pub fn to_json(value: &Value) -> serde_json::Value {
    match value.kind.as_ref() {
        Some(Kind::NullValue(_)) | None => serde_json::Value::Null,
        Some(Kind::BoolValue(v)) => serde_json::Value::Bool(*v),
        Some(Kind::NumberValue(v)) => serde_json::Number::from_f64(*v)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Some(Kind::StringValue(v)) => serde_json::Value::String(v.clone()),
        Some(Kind::ListValue(list)) => {
            serde_json::Value::Array(list.values.iter().map(to_json).collect())
        }
        Some(Kind::StructValue(s)) => serde_json::Value::Object(struct_to_json(s)),
    }
}

/// Decode a `Struct` into a JSON object map.
pub fn struct_to_json(value: &Struct) -> serde_json::Map<String, serde_json::Value> {
    value
        .fields
        .iter()
        .map(|(k, v)| (k.clone(), to_json(v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kind(value: &Value) -> &Kind {
        value.kind.as_ref().expect("value has a kind")
    }

    #[test]
    fn test_string_round_trip() {
        let value = "a string owo".to_grpc_value();
        assert!(matches!(kind(&value), Kind::StringValue(s) if s == "a string owo"));
        assert_eq!(to_json(&value), json!("a string owo"));

        let owned = String::from("owned");
        assert_eq!(owned.to_grpc_value(), "owned".to_grpc_value());
    }

    #[test]
    fn test_numbers_become_doubles() {
        assert!(matches!(kind(&1i32.to_grpc_value()), Kind::NumberValue(n) if *n == 1.0));
        assert!(matches!(kind(&1i64.to_grpc_value()), Kind::NumberValue(n) if *n == 1.0));
        assert!(matches!(kind(&1.5f32.to_grpc_value()), Kind::NumberValue(n) if *n == 1.5));
        assert!(matches!(kind(&2.25f64.to_grpc_value()), Kind::NumberValue(n) if *n == 2.25));
        assert!(matches!(kind(&7usize.to_grpc_value()), Kind::NumberValue(n) if *n == 7.0));
        assert_eq!(to_json(&42u16.to_grpc_value()), json!(42.0));
    }

    #[test]
    fn test_bool_round_trip() {
        let value = true.to_grpc_value();
        assert!(matches!(kind(&value), Kind::BoolValue(true)));
        assert_eq!(to_json(&false.to_grpc_value()), json!(false));
    }

    #[test]
    fn test_list_preserves_order() {
        let value = vec!["a", "b", "c"].to_grpc_value();
        let Kind::ListValue(list) = kind(&value) else {
            panic!("expected list value");
        };
        assert_eq!(list.values.len(), 3);
        assert_eq!(to_json(&value), json!(["a", "b", "c"]));
    }

    #[test]
    fn test_mixed_json_list() {
        let value = json!([1, "a", true]).to_grpc_value();
        let Kind::ListValue(list) = kind(&value) else {
            panic!("expected list value");
        };

        assert!(matches!(kind(&list.values[0]), Kind::NumberValue(n) if *n == 1.0));
        assert!(matches!(kind(&list.values[1]), Kind::StringValue(s) if s == "a"));
        assert!(matches!(kind(&list.values[2]), Kind::BoolValue(true)));
    }

    #[test]
    fn test_option_and_unit_are_null() {
        let none: Option<i32> = None;
        assert!(matches!(kind(&none.to_grpc_value()), Kind::NullValue(_)));
        assert!(matches!(kind(&Some(3).to_grpc_value()), Kind::NumberValue(_)));
        assert!(matches!(kind(&().to_grpc_value()), Kind::NullValue(_)));
        assert_eq!(to_json(&null_value()), serde_json::Value::Null);
    }

    #[test]
    fn test_maps_become_structs() {
        let mut map = BTreeMap::new();
        map.insert("count".to_string(), 12);
        map.insert("daemon".to_string(), 3);

        let value = map.to_grpc_value();
        assert!(matches!(kind(&value), Kind::StructValue(_)));
        assert_eq!(to_json(&value), json!({"count": 12.0, "daemon": 3.0}));
    }

    #[test]
    fn test_nested_json_round_trip() {
        let input = json!({
            "heap": {"used": 1024.0, "max": 4096.0},
            "pools": ["eden", "survivor"],
            "enabled": true,
            "note": null
        });
        assert_eq!(to_json(&input.to_grpc_value()), input);
    }

    #[test]
    fn test_protobuf_values_pass_through() {
        let value = "x".to_grpc_value();
        assert_eq!(value.to_grpc_value(), value);

        let list = ListValue::default();
        assert!(matches!(kind(&list.to_grpc_value()), Kind::ListValue(_)));

        let st = Struct::default();
        assert!(matches!(kind(&st.to_grpc_value()), Kind::StructValue(_)));
    }

    #[test]
    fn test_dynamic_scalars() {
        assert_eq!(to_value(&"a string owo").unwrap(), "a string owo".to_grpc_value());
        assert_eq!(to_value(&1i32).unwrap(), 1.0f64.to_grpc_value());
        assert_eq!(to_value(&1i64).unwrap(), 1.0f64.to_grpc_value());
        assert_eq!(to_value(&1.0f32).unwrap(), 1.0f64.to_grpc_value());
        assert_eq!(to_value(&true).unwrap(), true.to_grpc_value());
        assert_eq!(
            to_value(&vec!["a".to_string(), "b".to_string()]).unwrap(),
            json!(["a", "b"]).to_grpc_value()
        );
        assert!(to_value(&ListValue::default()).is_ok());
        assert!(to_value(&Struct::default()).is_ok());
    }

    #[test]
    fn test_dynamic_heterogeneous_list() {
        let payload: Vec<Box<dyn Any>> = vec![Box::new(1i32), Box::new("a"), Box::new(true)];
        let value = to_value(&payload).unwrap();
        assert_eq!(to_json(&value), json!([1.0, "a", true]));
    }

    #[test]
    fn test_dynamic_optional_scalars() {
        assert_eq!(to_value(&None::<String>).unwrap(), null_value());
        assert_eq!(to_value(&Some(2.5f64)).unwrap(), 2.5f64.to_grpc_value());

        let payload: Vec<Box<dyn Any>> = vec![
            Box::new("a"),
            Box::new(None::<String>),
            Box::new(Some(true)),
            Box::new(()),
        ];
        let value = to_value(&payload).unwrap();
        assert_eq!(to_json(&value), json!(["a", null, true, null]));
    }

    #[test]
    fn test_dynamic_rejects_unknown_type() {
        struct Opaque;
        assert_eq!(to_value(&Opaque), Err(ValueError::Unsupported));
    }

    #[test]
    fn test_dynamic_rejects_unknown_element_with_index() {
        struct Opaque;
        let payload: Vec<Box<dyn Any>> = vec![Box::new("ok"), Box::new(Opaque)];

        let err = to_value(&payload).unwrap_err();
        assert!(matches!(err, ValueError::UnsupportedElement { index: 1, .. }));
        assert!(err.to_string().contains("element 1"));
    }

    #[test]
    fn test_custom_type_via_trait() {
        struct MemoryUsage {
            used: u64,
            max: u64,
        }

        impl ToGrpcValue for MemoryUsage {
            fn to_grpc_value(&self) -> Value {
                let mut fields = BTreeMap::new();
                fields.insert("used".to_string(), self.used.to_grpc_value());
                fields.insert("max".to_string(), self.max.to_grpc_value());
                fields.to_grpc_value()
            }
        }

        let usage = MemoryUsage { used: 10, max: 20 };
        assert_eq!(to_json(&usage.to_grpc_value()), json!({"used": 10.0, "max": 20.0}));
    }

    #[test]
    fn test_non_finite_number_decodes_as_null() {
        assert_eq!(to_json(&f64::NAN.to_grpc_value()), serde_json::Value::Null);
    }
}
