//! Schema Normalizer
//!
//! Turns a raw, loosely-typed spec document (a generic `serde_json::Value`
//! tree, already deserialized by the loader) into a canonical [`SpecModel`].
//! Internal references are resolved eagerly and fully inlined, so downstream
//! components never see reference indirection. Reference cycles are detected
//! up front over a component digraph and fail fast.

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::error::{Result, SpecError};
use crate::model::{
    FieldDef, HttpMethod, Operation, Parameter, ParameterLocation, PathItem, PrimitiveType,
    SchemaNode, SpecModel,
};

/// Normalize a raw document into a [`SpecModel`].
///
/// The root must be a mapping containing a `paths` mapping. `info` and
/// `info.version` are optional here; their absence is a rule-engine concern.
pub fn normalize(doc: &Value) -> Result<SpecModel> {
    let root = doc
        .as_object()
        .ok_or_else(|| SpecError::parse("$", "document root must be a mapping"))?;

    let components = collect_components(root);
    check_reference_cycles(&components)?;
    let resolver = Resolver { components };

    let version = root
        .get("info")
        .and_then(|info| info.get("version"))
        .and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

    let paths_value = root
        .get("paths")
        .ok_or_else(|| SpecError::parse("$", "missing required key 'paths'"))?;
    let paths_obj = paths_value
        .as_object()
        .ok_or_else(|| SpecError::parse("paths", "'paths' must be a mapping"))?;

    let mut paths = Vec::with_capacity(paths_obj.len());
    for (template, item) in paths_obj {
        paths.push(parse_path_item(template, item, &resolver)?);
    }

    debug!(paths = paths.len(), "normalized spec document");
    Ok(SpecModel { version, paths })
}

/// Component schemas addressable by internal references, from
/// `#/components/schemas/<name>` (OpenAPI 3) or `#/definitions/<name>`
/// (Swagger 2).
fn collect_components(root: &serde_json::Map<String, Value>) -> HashMap<String, &Value> {
    let mut components = HashMap::new();
    if let Some(schemas) = root
        .get("components")
        .and_then(|c| c.get("schemas"))
        .and_then(Value::as_object)
    {
        for (name, schema) in schemas {
            components.insert(name.clone(), schema);
        }
    }
    if let Some(definitions) = root.get("definitions").and_then(Value::as_object) {
        for (name, schema) in definitions {
            components.entry(name.clone()).or_insert(schema);
        }
    }
    components
}

/// Extract the component name from an internal reference string.
fn component_name(reference: &str) -> Option<&str> {
    reference
        .strip_prefix("#/components/schemas/")
        .or_else(|| reference.strip_prefix("#/definitions/"))
        .filter(|name| !name.is_empty() && !name.contains('/'))
}

/// Build a digraph over component references and reject cycles before any
/// inlining starts, so the recursive resolver is guaranteed to terminate.
/// Dangling references between components are rejected here too.
fn check_reference_cycles(components: &HashMap<String, &Value>) -> Result<()> {
    let mut names: Vec<&str> = components.keys().map(String::as_str).collect();
    names.sort_unstable();

    let mut graph: DiGraph<&str, ()> = DiGraph::with_capacity(names.len(), names.len());
    let mut indices: HashMap<&str, NodeIndex> = HashMap::with_capacity(names.len());
    for &name in &names {
        indices.insert(name, graph.add_node(name));
    }

    for &name in &names {
        let mut refs = Vec::new();
        collect_refs(components[name], &mut refs);
        for reference in refs {
            let target = component_name(reference).ok_or_else(|| SpecError::UnresolvedReference {
                location: format!("components.schemas.{name}"),
                reference: reference.to_string(),
            })?;
            let &to = indices
                .get(target)
                .ok_or_else(|| SpecError::UnresolvedReference {
                    location: format!("components.schemas.{name}"),
                    reference: reference.to_string(),
                })?;
            let from = indices[name];
            if from == to {
                return Err(SpecError::CircularReference {
                    cycle: format!("{name} -> {name}"),
                });
            }
            graph.add_edge(from, to, ());
        }
    }

    for scc in kosaraju_scc(&graph) {
        if scc.len() > 1 {
            let mut members: Vec<&str> = scc.iter().map(|&idx| graph[idx]).collect();
            members.sort_unstable();
            return Err(SpecError::CircularReference {
                cycle: members.join(" -> "),
            });
        }
    }
    Ok(())
}

/// Collect every `$ref` string reachable in a value tree.
fn collect_refs<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == "$ref" {
                    if let Some(target) = child.as_str() {
                        out.push(target);
                    }
                } else {
                    collect_refs(child, out);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_refs(item, out);
            }
        }
        _ => {}
    }
}

struct Resolver<'a> {
    components: HashMap<String, &'a Value>,
}

impl<'a> Resolver<'a> {
    fn lookup(&self, reference: &str, location: &str) -> Result<&'a Value> {
        let name = component_name(reference).ok_or_else(|| SpecError::UnresolvedReference {
            location: location.to_string(),
            reference: reference.to_string(),
        })?;
        self.components
            .get(name)
            .copied()
            .ok_or_else(|| SpecError::UnresolvedReference {
                location: location.to_string(),
                reference: reference.to_string(),
            })
    }
}

fn parse_path_item(template: &str, value: &Value, resolver: &Resolver<'_>) -> Result<PathItem> {
    let location = format!("paths.{template}");
    let obj = value
        .as_object()
        .ok_or_else(|| SpecError::parse(&location, "path item must be a mapping"))?;

    // Path-level parameters apply to every operation; operation-level
    // entries win on identity collision.
    let shared_params = match obj.get("parameters") {
        Some(params) => parse_parameters(params, &location, resolver)?,
        None => Vec::new(),
    };

    let mut operations = Vec::new();
    for (key, op_value) in obj {
        if key.starts_with("x-") || key == "parameters" {
            continue;
        }
        let Some(method) = HttpMethod::parse(key) else {
            // summary, description, servers and friends
            continue;
        };
        operations.push(parse_operation(
            method,
            op_value,
            &shared_params,
            &location,
            resolver,
        )?);
    }

    Ok(PathItem {
        template: template.to_string(),
        operations,
    })
}

fn parse_operation(
    method: HttpMethod,
    value: &Value,
    shared_params: &[Parameter],
    path_location: &str,
    resolver: &Resolver<'_>,
) -> Result<Operation> {
    let location = format!("{}.{}", path_location, method.as_str().to_lowercase());
    let obj = value
        .as_object()
        .ok_or_else(|| SpecError::parse(&location, "operation must be a mapping"))?;

    let operation_id = obj
        .get("operationId")
        .and_then(Value::as_str)
        .map(str::to_string);
    let deprecated = obj
        .get("deprecated")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let mut parameters = match obj.get("parameters") {
        Some(params) => parse_parameters(params, &location, resolver)?,
        None => Vec::new(),
    };
    for shared in shared_params {
        if parameters.iter().all(|p| p.identity() != shared.identity()) {
            parameters.push(shared.clone());
        }
    }

    let request_body = match obj.get("requestBody") {
        Some(body) => Some(match embedded_schema(body) {
            Some(schema) => schema_node(schema, &format!("{location}.requestBody"), resolver)?,
            None => SchemaNode::empty_object(),
        }),
        None => None,
    };

    let mut responses = Vec::new();
    if let Some(resp_obj) = obj.get("responses").and_then(Value::as_object) {
        for (status, response) in resp_obj {
            let resp_location = format!("{location}.responses.{status}");
            let node = match embedded_schema(response) {
                Some(schema) => schema_node(schema, &resp_location, resolver)?,
                None => SchemaNode::empty_object(),
            };
            responses.push((status.clone(), node));
        }
    }

    Ok(Operation {
        method,
        operation_id,
        deprecated,
        parameters,
        request_body,
        responses,
    })
}

/// The schema inside a request body or response: OpenAPI 3 nests it under
/// `content/<media-type>/schema` (first media type wins), Swagger 2 puts it
/// directly under `schema`.
fn embedded_schema(container: &Value) -> Option<&Value> {
    if let Some(content) = container.get("content").and_then(Value::as_object) {
        return content.values().next().and_then(|media| media.get("schema"));
    }
    container.get("schema")
}

fn parse_parameters(
    value: &Value,
    location: &str,
    resolver: &Resolver<'_>,
) -> Result<Vec<Parameter>> {
    let arr = value
        .as_array()
        .ok_or_else(|| SpecError::parse(format!("{location}.parameters"), "parameters must be a sequence"))?;

    let mut parameters: Vec<Parameter> = Vec::with_capacity(arr.len());
    for (index, param) in arr.iter().enumerate() {
        let param_location = format!("{location}.parameters[{index}]");
        let obj = param
            .as_object()
            .ok_or_else(|| SpecError::parse(&param_location, "parameter must be a mapping"))?;

        let name = obj
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| SpecError::parse(&param_location, "parameter is missing 'name'"))?;
        let loc = obj
            .get("in")
            .and_then(Value::as_str)
            .and_then(ParameterLocation::parse)
            .ok_or_else(|| {
                SpecError::parse(&param_location, "parameter 'in' must be path, query, header, or cookie")
            })?;
        let required = obj
            .get("required")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        // OpenAPI 3 nests the type under `schema`; Swagger 2 puts `type`
        // directly on the parameter.
        let schema = if let Some(schema) = obj.get("schema") {
            schema_node(schema, &param_location, resolver)?
        } else if obj.contains_key("type") {
            schema_node(param, &param_location, resolver)?
        } else {
            SchemaNode::empty_object()
        };

        let candidate = Parameter {
            name: name.to_string(),
            location: loc,
            required,
            schema,
        };
        if parameters.iter().any(|p| p.identity() == candidate.identity()) {
            return Err(SpecError::parse(
                &param_location,
                format!("duplicate parameter '{}' in '{}'", name, loc),
            ));
        }
        parameters.push(candidate);
    }
    Ok(parameters)
}

/// Recursively normalize one schema value. References are inlined here; the
/// cycle check up front guarantees termination.
fn schema_node(value: &Value, location: &str, resolver: &Resolver<'_>) -> Result<SchemaNode> {
    let obj = value
        .as_object()
        .ok_or_else(|| SpecError::parse(location, "schema must be a mapping"))?;

    if let Some(reference) = obj.get("$ref") {
        let target = reference
            .as_str()
            .ok_or_else(|| SpecError::parse(location, "$ref must be a string"))?;
        let resolved = resolver.lookup(target, location)?;
        return schema_node(resolved, location, resolver);
    }

    let declared_type = match obj.get("type") {
        Some(Value::String(name)) => Some(name.as_str()),
        Some(_) => return Err(SpecError::parse(location, "'type' must be a string")),
        None => None,
    };

    match declared_type {
        Some("object") => object_node(obj, location, resolver),
        Some("array") => array_node(obj, location, resolver),
        Some(name) => {
            let primitive = PrimitiveType::parse(name).ok_or_else(|| {
                SpecError::parse(location, format!("unknown type '{name}'"))
            })?;
            let format = obj.get("format").and_then(Value::as_str).map(str::to_string);
            Ok(SchemaNode::Scalar { primitive, format })
        }
        None if obj.contains_key("properties") => object_node(obj, location, resolver),
        None if obj.contains_key("items") => array_node(obj, location, resolver),
        // Shapeless schemas ({} and metadata-only mappings) stay permissive.
        None => Ok(SchemaNode::empty_object()),
    }
}

fn object_node(
    obj: &serde_json::Map<String, Value>,
    location: &str,
    resolver: &Resolver<'_>,
) -> Result<SchemaNode> {
    let mut fields = Vec::new();
    if let Some(properties) = obj.get("properties") {
        let props = properties
            .as_object()
            .ok_or_else(|| SpecError::parse(location, "'properties' must be a mapping"))?;
        for (name, prop) in props {
            let field_location = format!("{location}.{name}");
            fields.push(FieldDef {
                name: name.clone(),
                schema: schema_node(prop, &field_location, resolver)?,
            });
        }
    }
    let required = obj
        .get("required")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    Ok(SchemaNode::Object { fields, required })
}

fn array_node(
    obj: &serde_json::Map<String, Value>,
    location: &str,
    resolver: &Resolver<'_>,
) -> Result<SchemaNode> {
    let items = match obj.get("items") {
        Some(items) => schema_node(items, &format!("{location}.items"), resolver)?,
        None => SchemaNode::empty_object(),
    };
    Ok(SchemaNode::Array {
        items: Box::new(items),
    })
}
