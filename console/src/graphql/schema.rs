//! # Client Schema
//!
//! A project's GraphQL schema, rebuilt from the introspection JSON the
//! console API hands out (for example the action schema of a model
//! mutation). The introspection result is rendered to SDL and handed to
//! `apollo-compiler`, which builds and validates the type system. The
//! schema is read-only once built and is shared behind an `Arc` by every
//! session that validates against it.

use apollo_compiler::validation::Valid;
use apollo_compiler::Schema;
use serde::Deserialize;
use thiserror::Error;

/// Names of the scalars every GraphQL schema carries
pub const BUILT_IN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];

const BUILT_IN_DIRECTIVES: [&str; 4] = ["skip", "include", "deprecated", "specifiedBy"];

/// Source name reported in schema diagnostics
const SCHEMA_SOURCE_NAME: &str = "introspection.graphql";

#[derive(Debug, Error)]
pub enum SchemaBuildError {
    #[error("schema document is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("introspection result has no __schema entry")]
    MissingSchema,
    #[error("introspection result does not declare a query root type")]
    MissingQueryType,
    #[error("malformed type reference: {0}")]
    MalformedTypeRef(&'static str),
    #[error("type {0} has a kind that cannot be declared")]
    UndeclarableType(String),
    #[error("introspected type system is invalid: {0}")]
    Invalid(String),
}

/// Type system used for client-side query validation
#[derive(Debug, Clone)]
pub struct ClientSchema {
    schema: Valid<Schema>,
    query_type: String,
    mutation_type: Option<String>,
    subscription_type: Option<String>,
}

impl ClientSchema {
    /// Build from an introspection JSON document; accepts both the bare
    /// `{"__schema": ..}` shape and a full `{"data": {"__schema": ..}}` response
    pub fn from_introspection_str(source: &str) -> Result<Self, SchemaBuildError> {
        let value: serde_json::Value = serde_json::from_str(source)?;
        Self::from_introspection(value)
    }

    pub fn from_introspection(value: serde_json::Value) -> Result<Self, SchemaBuildError> {
        let schema_value = match value {
            serde_json::Value::Object(mut root) => match root.remove("__schema") {
                Some(schema) => schema,
                None => root
                    .remove("data")
                    .and_then(|mut data| data.get_mut("__schema").map(serde_json::Value::take))
                    .ok_or(SchemaBuildError::MissingSchema)?,
            },
            _ => return Err(SchemaBuildError::MissingSchema),
        };

        let introspection: IntrospectionSchema = serde_json::from_value(schema_value)?;
        Self::build(introspection)
    }

    fn build(introspection: IntrospectionSchema) -> Result<Self, SchemaBuildError> {
        let sdl = render_sdl(&introspection)?;
        let schema = Schema::parse_and_validate(sdl, SCHEMA_SOURCE_NAME).map_err(|invalid| {
            let messages: Vec<String> = invalid
                .errors
                .iter()
                .map(|diagnostic| diagnostic.error.to_string())
                .collect();
            SchemaBuildError::Invalid(messages.join("; "))
        })?;

        Ok(Self {
            schema,
            query_type: introspection.query_type.map(|r| r.name).unwrap_or_default(),
            mutation_type: introspection.mutation_type.map(|r| r.name),
            subscription_type: introspection.subscription_type.map(|r| r.name),
        })
    }

    pub fn query_type(&self) -> &str {
        &self.query_type
    }

    pub fn mutation_type(&self) -> Option<&str> {
        self.mutation_type.as_deref()
    }

    pub fn subscription_type(&self) -> Option<&str> {
        self.subscription_type.as_deref()
    }

    pub fn has_type(&self, name: &str) -> bool {
        self.schema.types.contains_key(name)
    }

    /// Number of named types, built-in scalars and introspection types included
    pub fn type_count(&self) -> usize {
        self.schema.types.len()
    }

    pub fn as_valid(&self) -> &Valid<Schema> {
        &self.schema
    }
}

fn render_sdl(introspection: &IntrospectionSchema) -> Result<String, SchemaBuildError> {
    let query = introspection
        .query_type
        .as_ref()
        .ok_or(SchemaBuildError::MissingQueryType)?;

    let mut sdl = format!("schema {{\n  query: {}\n", query.name);
    if let Some(mutation) = &introspection.mutation_type {
        sdl.push_str(&format!("  mutation: {}\n", mutation.name));
    }
    if let Some(subscription) = &introspection.subscription_type {
        sdl.push_str(&format!("  subscription: {}\n", subscription.name));
    }
    sdl.push_str("}\n");

    for introspected in &introspection.types {
        if introspected.name.starts_with("__") || BUILT_IN_SCALARS.contains(&introspected.name.as_str()) {
            continue;
        }
        sdl.push('\n');
        sdl.push_str(&render_type(introspected)?);
    }

    for directive in &introspection.directives {
        if BUILT_IN_DIRECTIVES.contains(&directive.name.as_str()) {
            continue;
        }
        if directive.locations.is_empty() {
            return Err(SchemaBuildError::Invalid(format!(
                "directive @{} has no locations",
                directive.name
            )));
        }
        sdl.push_str(&format!(
            "\ndirective @{}{}{} on {}\n",
            directive.name,
            render_arguments(&directive.args)?,
            if directive.is_repeatable { " repeatable" } else { "" },
            directive.locations.join(" | ")
        ));
    }
    Ok(sdl)
}

fn render_type(introspected: &IntrospectionType) -> Result<String, SchemaBuildError> {
    let name = &introspected.name;
    let rendered = match introspected.kind {
        IntrospectionKind::Scalar => format!("scalar {name}\n"),
        IntrospectionKind::Object => format!(
            "type {name}{} {{\n{}}}\n",
            render_implements(&introspected.interfaces)?,
            render_fields(&introspected.fields)?
        ),
        IntrospectionKind::Interface => format!(
            "interface {name}{} {{\n{}}}\n",
            render_implements(&introspected.interfaces)?,
            render_fields(&introspected.fields)?
        ),
        IntrospectionKind::Union => {
            let members = named_refs(&introspected.possible_types)?;
            format!("union {name} = {}\n", members.join(" | "))
        }
        IntrospectionKind::Enum => {
            let values: String = introspected
                .enum_values
                .iter()
                .map(|value| format!("  {}{}\n", value.name, render_deprecation(value)))
                .collect();
            format!("enum {name} {{\n{values}}}\n")
        }
        IntrospectionKind::InputObject => {
            let mut fields = String::new();
            for value in &introspected.input_fields {
                fields.push_str(&format!("  {}\n", render_input_value(value)?));
            }
            format!("input {name} {{\n{fields}}}\n")
        }
        IntrospectionKind::List | IntrospectionKind::NonNull => {
            return Err(SchemaBuildError::UndeclarableType(name.clone()))
        }
    };
    Ok(rendered)
}

fn render_implements(interfaces: &[IntrospectionTypeRef]) -> Result<String, SchemaBuildError> {
    let names = named_refs(interfaces)?;
    if names.is_empty() {
        Ok(String::new())
    } else {
        Ok(format!(" implements {}", names.join(" & ")))
    }
}

fn render_fields(fields: &[IntrospectionField]) -> Result<String, SchemaBuildError> {
    let mut rendered = String::new();
    for field in fields {
        rendered.push_str(&format!(
            "  {}{}: {}{}\n",
            field.name,
            render_arguments(&field.args)?,
            render_type_ref(&field.ty)?,
            render_deprecation(field)
        ));
    }
    Ok(rendered)
}

fn render_arguments(args: &[IntrospectionInputValue]) -> Result<String, SchemaBuildError> {
    if args.is_empty() {
        return Ok(String::new());
    }
    let rendered = args
        .iter()
        .map(render_input_value)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("({})", rendered.join(", ")))
}

fn render_input_value(value: &IntrospectionInputValue) -> Result<String, SchemaBuildError> {
    let ty = render_type_ref(&value.ty)?;
    // Introspection reports defaults in GraphQL literal syntax
    Ok(match &value.default_value {
        Some(default) => format!("{}: {} = {}", value.name, ty, default),
        None => format!("{}: {}", value.name, ty),
    })
}

fn render_deprecation(member: &impl Deprecatable) -> String {
    if !member.is_deprecated() {
        return String::new();
    }
    match member.deprecation_reason() {
        Some(reason) => format!(
            " @deprecated(reason: {})",
            serde_json::Value::String(reason.to_string())
        ),
        None => " @deprecated".to_string(),
    }
}

fn render_type_ref(introspected: &IntrospectionTypeRef) -> Result<String, SchemaBuildError> {
    match introspected.kind {
        IntrospectionKind::List => {
            let inner = introspected
                .of_type
                .as_deref()
                .ok_or(SchemaBuildError::MalformedTypeRef("list without an item type"))?;
            Ok(format!("[{}]", render_type_ref(inner)?))
        }
        IntrospectionKind::NonNull => {
            let inner = introspected
                .of_type
                .as_deref()
                .ok_or(SchemaBuildError::MalformedTypeRef("non-null without an inner type"))?;
            if matches!(inner.kind, IntrospectionKind::NonNull) {
                return Err(SchemaBuildError::MalformedTypeRef(
                    "non-null cannot wrap another non-null",
                ));
            }
            Ok(format!("{}!", render_type_ref(inner)?))
        }
        _ => introspected
            .name
            .clone()
            .ok_or(SchemaBuildError::MalformedTypeRef("named reference without a name")),
    }
}

fn named_refs(refs: &[IntrospectionTypeRef]) -> Result<Vec<&str>, SchemaBuildError> {
    refs.iter()
        .map(|r| {
            r.name
                .as_deref()
                .ok_or(SchemaBuildError::MalformedTypeRef("named reference without a name"))
        })
        .collect()
}

trait Deprecatable {
    fn is_deprecated(&self) -> bool;
    fn deprecation_reason(&self) -> Option<&str>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectionSchema {
    query_type: Option<NamedTypeRef>,
    #[serde(default)]
    mutation_type: Option<NamedTypeRef>,
    #[serde(default)]
    subscription_type: Option<NamedTypeRef>,
    types: Vec<IntrospectionType>,
    #[serde(default)]
    directives: Vec<IntrospectionDirective>,
}

#[derive(Debug, Deserialize)]
struct NamedTypeRef {
    name: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum IntrospectionKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

// Servers send `null` for members that do not apply to a kind
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectionType {
    kind: IntrospectionKind,
    name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    fields: Vec<IntrospectionField>,
    #[serde(default, deserialize_with = "null_as_empty")]
    input_fields: Vec<IntrospectionInputValue>,
    #[serde(default, deserialize_with = "null_as_empty")]
    interfaces: Vec<IntrospectionTypeRef>,
    #[serde(default, deserialize_with = "null_as_empty")]
    enum_values: Vec<IntrospectionEnumValue>,
    #[serde(default, deserialize_with = "null_as_empty")]
    possible_types: Vec<IntrospectionTypeRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectionField {
    name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    args: Vec<IntrospectionInputValue>,
    #[serde(rename = "type")]
    ty: IntrospectionTypeRef,
    #[serde(default)]
    is_deprecated: bool,
    #[serde(default)]
    deprecation_reason: Option<String>,
}

impl Deprecatable for IntrospectionField {
    fn is_deprecated(&self) -> bool {
        self.is_deprecated
    }

    fn deprecation_reason(&self) -> Option<&str> {
        self.deprecation_reason.as_deref()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectionInputValue {
    name: String,
    #[serde(rename = "type")]
    ty: IntrospectionTypeRef,
    #[serde(default)]
    default_value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectionEnumValue {
    name: String,
    #[serde(default)]
    is_deprecated: bool,
    #[serde(default)]
    deprecation_reason: Option<String>,
}

impl Deprecatable for IntrospectionEnumValue {
    fn is_deprecated(&self) -> bool {
        self.is_deprecated
    }

    fn deprecation_reason(&self) -> Option<&str> {
        self.deprecation_reason.as_deref()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectionTypeRef {
    kind: IntrospectionKind,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    of_type: Option<Box<IntrospectionTypeRef>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectionDirective {
    name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    locations: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    args: Vec<IntrospectionInputValue>,
    #[serde(default)]
    is_repeatable: bool,
}
