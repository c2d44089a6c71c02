use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, Ident, LitStr};

struct SchemaField {
    ident: Ident,
    wire_name: String,
    required: bool,
}

pub fn derive_event_schema(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let event_type = parse_event_type(input)?;

    let fields = match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "EventSchema derive only supports structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "EventSchema derive only supports structs",
            ))
        }
    };

    let mut protocol_version: Option<Ident> = None;
    let mut schema_fields = Vec::new();

    for field in fields {
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        let attrs = parse_field_attrs(&field.attrs)?;

        if attrs.protocol_version {
            if protocol_version.is_some() {
                return Err(syn::Error::new_spanned(
                    &ident,
                    "only one field may be marked #[schema(protocol_version)]",
                ));
            }
            protocol_version = Some(ident);
            continue;
        }
        if attrs.skip {
            continue;
        }

        let wire_name = attrs
            .rename
            .unwrap_or_else(|| to_camel_case(&ident.to_string()));
        schema_fields.push(SchemaField {
            ident,
            wire_name,
            required: attrs.required,
        });
    }

    let protocol_version = protocol_version.ok_or_else(|| {
        syn::Error::new_spanned(
            name,
            "EventSchema derive needs a field marked #[schema(protocol_version)]",
        )
    })?;

    let accessors = schema_fields.iter().map(|field| {
        let ident = &field.ident;
        let wire_name = &field.wire_name;
        let getter = format_ident!("get_{}", ident);
        let setter = format_ident!("set_{}", ident);
        quote! {
            fn #getter(event: &#name) -> ::metastore_events::event::schema::FieldValue {
                ::metastore_events::event::schema::ToFieldValue::to_field_value(&event.#ident)
            }

            fn #setter(
                event: &mut #name,
                value: ::metastore_events::event::schema::FieldValue,
            ) -> ::core::result::Result<(), ::metastore_events::error::SerDeError> {
                event.#ident =
                    ::metastore_events::event::schema::FromFieldValue::from_field_value(#wire_name, value)?;
                ::core::result::Result::Ok(())
            }
        }
    });

    let descriptors = schema_fields.iter().map(|field| {
        let wire_name = &field.wire_name;
        let required = field.required;
        let getter = format_ident!("get_{}", field.ident);
        let setter = format_ident!("set_{}", field.ident);
        quote! {
            ::metastore_events::event::schema::FieldDescriptor {
                name: #wire_name,
                required: #required,
                get: #getter,
                set: #setter,
            }
        }
    });

    Ok(quote! {
        impl ::metastore_events::event::schema::EventSchema for #name {
            const EVENT_TYPE: ::metastore_events::event::EventType =
                ::metastore_events::event::EventType::#event_type;

            fn fields() -> &'static [::metastore_events::event::schema::FieldDescriptor<Self>] {
                #(#accessors)*

                static FIELDS: &[::metastore_events::event::schema::FieldDescriptor<#name>] = &[
                    #(#descriptors),*
                ];
                FIELDS
            }

            fn protocol_version(&self) -> &str {
                &self.#protocol_version
            }

            fn set_protocol_version(&mut self, version: ::std::string::String) {
                self.#protocol_version = version;
            }
        }
    })
}

fn parse_event_type(input: &DeriveInput) -> syn::Result<Ident> {
    for attr in &input.attrs {
        if !attr.path().is_ident("schema") {
            continue;
        }

        let mut event_type = None;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("event_type") {
                let value: LitStr = meta.value()?.parse()?;
                event_type = Some(Ident::new(&value.value(), value.span()));
                Ok(())
            } else {
                Err(meta.error("unsupported struct-level schema attribute"))
            }
        })?;

        if let Some(event_type) = event_type {
            return Ok(event_type);
        }
    }

    Err(syn::Error::new(
        Span::call_site(),
        "EventSchema derive needs #[schema(event_type = \"...\")]",
    ))
}

#[derive(Default)]
struct FieldAttrs {
    protocol_version: bool,
    required: bool,
    skip: bool,
    rename: Option<String>,
}

fn parse_field_attrs(attrs: &[syn::Attribute]) -> syn::Result<FieldAttrs> {
    let mut parsed = FieldAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("schema") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("protocol_version") {
                parsed.protocol_version = true;
            } else if meta.path.is_ident("required") {
                parsed.required = true;
            } else if meta.path.is_ident("skip") {
                parsed.skip = true;
            } else if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                parsed.rename = Some(value.value());
            } else {
                return Err(meta.error("unsupported field-level schema attribute"));
            }
            Ok(())
        })?;
    }

    Ok(parsed)
}

fn to_camel_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut upper_next = false;
    for ch in s.chars() {
        if ch == '_' {
            upper_next = !result.is_empty();
        } else if upper_next {
            result.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            result.push(ch);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::to_camel_case;

    #[test]
    fn snake_case_becomes_camel_case() {
        assert_eq!(to_camel_case("db_name"), "dbName");
        assert_eq!(to_camel_case("old_partition_location"), "oldPartitionLocation");
        assert_eq!(to_camel_case("files"), "files");
    }

    #[test]
    fn leading_underscore_is_dropped() {
        assert_eq!(to_camel_case("_internal_flag"), "internalFlag");
    }
}
