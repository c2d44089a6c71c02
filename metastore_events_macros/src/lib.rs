mod event_schema;

use proc_macro::TokenStream;

/// Derive macro that generates the static field descriptor table of a
/// canonical metastore event.
///
/// Each named field becomes one `FieldDescriptor` (wire name, getter, setter),
/// in declaration order. The codecs only ever walk this table, so adding a
/// field to an event struct is enough to put it on the wire.
///
/// # Usage
///
/// ```ignore
/// #[derive(Clone, Debug, Default, PartialEq, Eq, EventSchema)]
/// #[schema(event_type = "DropTable")]
/// pub struct DropTable {
///     #[schema(protocol_version)]
///     pub protocol_version: String,
///     #[schema(required)]
///     pub db_name: String,
///     #[schema(required)]
///     pub table_name: String,
///     pub table_location: Option<String>,
///     pub delete_data: bool,
/// }
/// ```
///
/// Struct attributes:
/// - `event_type = "Variant"`: the `EventType` variant this struct encodes
///
/// Field attributes:
/// - `protocol_version`: marks the header field holding the schema version;
///   it is excluded from the descriptor table
/// - `required`: decoding fails when the field is absent from the payload
/// - `rename = "wireName"`: overrides the default camelCase wire name
/// - `skip`: leaves the field out of the wire format entirely
#[proc_macro_derive(EventSchema, attributes(schema))]
pub fn derive_event_schema(input: TokenStream) -> TokenStream {
    event_schema::derive_event_schema(input)
}
