//! Field specifications and the reordered type description.

use riff_result::{Error, Result};

use crate::data_type::ScalarType;

/// One field of a caller-supplied schema, before reordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: String,
    pub data_type: ScalarType,
    pub nullable: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: ScalarType, nullable: bool) -> Field {
        Field {
            name: name.into(),
            data_type,
            nullable,
        }
    }
}

/// Field specification within a type description.
///
/// `position` is the index in the reordered read layout (indexed fields
/// first); `orig_position` is the index in the caller-supplied schema and is
/// stable through serialization round trips.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeSpec {
    name: String,
    data_type: ScalarType,
    nullable: bool,
    indexed: bool,
    position: usize,
    orig_position: usize,
}

impl TypeSpec {
    pub fn new(
        name: impl Into<String>,
        data_type: ScalarType,
        nullable: bool,
        indexed: bool,
        position: usize,
        orig_position: usize,
    ) -> TypeSpec {
        TypeSpec {
            name: name.into(),
            data_type,
            nullable,
            indexed,
            position,
            orig_position,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> ScalarType {
        self.data_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Whether this field carries per-stripe statistics and filters.
    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Position of the field in the original schema, used by write paths.
    pub fn orig_position(&self) -> usize {
        self.orig_position
    }
}

impl std::fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TypeSpec({}: {}, indexed={}, position={}, orig_position={})",
            self.name, self.data_type, self.indexed, self.position, self.orig_position
        )
    }
}

/// Ordered list of field specifications with the indexed fields occupying a
/// contiguous prefix.
///
/// Invariants: names are unique; positions are dense `0..n`; `orig_position`
/// values are a permutation of `0..n`. Immutable after construction and safe
/// to share across read sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescription {
    specs: Vec<TypeSpec>,
    num_indexed: usize,
}

impl TypeDescription {
    /// Build a type description from a schema and the names of the columns
    /// to index.
    ///
    /// Indexed fields are moved to the front (stable by original position
    /// within each group) and positions reassigned densely. Fails with
    /// [`Error::SchemaError`] on duplicate names, an unknown indexed name,
    /// or an indexed column whose type is not orderable.
    pub fn new(schema: &[Field], indexed_names: &[&str]) -> Result<TypeDescription> {
        for (i, field) in schema.iter().enumerate() {
            if schema[..i].iter().any(|f| f.name == field.name) {
                return Err(Error::SchemaError(format!(
                    "duplicate field name '{}'",
                    field.name
                )));
            }
        }
        for name in indexed_names {
            let field = schema
                .iter()
                .find(|f| f.name == *name)
                .ok_or_else(|| Error::SchemaError(format!("indexed field '{name}' not found")))?;
            if !field.data_type.is_orderable() {
                return Err(Error::SchemaError(format!(
                    "indexed field '{}' has non-orderable type {}",
                    field.name, field.data_type
                )));
            }
        }

        let is_indexed = |f: &Field| indexed_names.iter().any(|n| *n == f.name);
        let mut specs = Vec::with_capacity(schema.len());
        let mut num_indexed = 0;
        for (orig_position, field) in schema.iter().enumerate() {
            if is_indexed(field) {
                specs.push(TypeSpec::new(
                    field.name.clone(),
                    field.data_type,
                    field.nullable,
                    true,
                    0,
                    orig_position,
                ));
                num_indexed += 1;
            }
        }
        for (orig_position, field) in schema.iter().enumerate() {
            if !is_indexed(field) {
                specs.push(TypeSpec::new(
                    field.name.clone(),
                    field.data_type,
                    field.nullable,
                    false,
                    0,
                    orig_position,
                ));
            }
        }
        for (position, spec) in specs.iter_mut().enumerate() {
            spec.position = position;
        }
        Ok(TypeDescription { specs, num_indexed })
    }

    /// Reassemble a type description from deserialized specs, revalidating
    /// the structural invariants.
    pub fn from_specs(mut specs: Vec<TypeSpec>) -> Result<TypeDescription> {
        specs.sort_by_key(|s| s.position);
        let n = specs.len();
        let mut num_indexed = 0;
        let mut orig_seen = vec![false; n];
        for (i, spec) in specs.iter().enumerate() {
            if spec.position != i {
                return Err(Error::SchemaError(format!(
                    "field positions are not dense at '{}'",
                    spec.name
                )));
            }
            if spec.orig_position >= n || orig_seen[spec.orig_position] {
                return Err(Error::SchemaError(format!(
                    "original positions are not a permutation at '{}'",
                    spec.name
                )));
            }
            orig_seen[spec.orig_position] = true;
            if specs[..i].iter().any(|s| s.name == spec.name) {
                return Err(Error::SchemaError(format!(
                    "duplicate field name '{}'",
                    spec.name
                )));
            }
            if spec.indexed {
                if i != num_indexed {
                    return Err(Error::SchemaError(format!(
                        "indexed field '{}' is outside the indexed prefix",
                        spec.name
                    )));
                }
                if !spec.data_type.is_orderable() {
                    return Err(Error::SchemaError(format!(
                        "indexed field '{}' has non-orderable type {}",
                        spec.name, spec.data_type
                    )));
                }
                num_indexed += 1;
            }
        }
        Ok(TypeDescription { specs, num_indexed })
    }

    /// Position of the named field in the read layout.
    pub fn position(&self, name: &str) -> Result<usize> {
        self.specs
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| Error::UnknownColumn(name.to_string()))
    }

    /// Field specification at `ordinal`.
    pub fn at(&self, ordinal: usize) -> &TypeSpec {
        &self.specs[ordinal]
    }

    /// Number of fields.
    pub fn size(&self) -> usize {
        self.specs.len()
    }

    /// Number of indexed fields; these occupy positions `0..num_indexed()`.
    pub fn num_indexed(&self) -> usize {
        self.num_indexed
    }

    /// Specs in position order.
    pub fn specs(&self) -> &[TypeSpec] {
        &self.specs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Vec<Field> {
        vec![
            Field::new("col1", ScalarType::Utf8, true),
            Field::new("col2", ScalarType::Int, false),
            Field::new("col3", ScalarType::Long, true),
        ]
    }

    #[test]
    fn indexed_fields_move_to_front() {
        let td = TypeDescription::new(&schema(), &["col3", "col2"]).unwrap();
        assert_eq!(td.size(), 3);
        assert_eq!(td.num_indexed(), 2);
        // stable by original position within the indexed group
        assert_eq!(td.at(0).name(), "col2");
        assert_eq!(td.at(1).name(), "col3");
        assert_eq!(td.at(2).name(), "col1");
        for (i, spec) in td.specs().iter().enumerate() {
            assert_eq!(spec.position(), i);
        }
        assert_eq!(td.at(0).orig_position(), 1);
        assert_eq!(td.at(1).orig_position(), 2);
        assert_eq!(td.at(2).orig_position(), 0);
    }

    #[test]
    fn no_indexed_fields_keeps_order() {
        let td = TypeDescription::new(&schema(), &[]).unwrap();
        assert_eq!(td.num_indexed(), 0);
        assert_eq!(td.at(0).name(), "col1");
        assert_eq!(td.at(2).name(), "col3");
    }

    #[test]
    fn position_lookup() {
        let td = TypeDescription::new(&schema(), &["col2"]).unwrap();
        assert_eq!(td.position("col2").unwrap(), 0);
        assert_eq!(td.position("col1").unwrap(), 1);
        assert!(matches!(
            td.position("ghost"),
            Err(riff_result::Error::UnknownColumn(_))
        ));
    }

    #[test]
    fn duplicate_names_rejected() {
        let schema = vec![
            Field::new("a", ScalarType::Int, true),
            Field::new("a", ScalarType::Long, true),
        ];
        assert!(matches!(
            TypeDescription::new(&schema, &[]),
            Err(riff_result::Error::SchemaError(_))
        ));
    }

    #[test]
    fn unknown_indexed_name_rejected() {
        assert!(matches!(
            TypeDescription::new(&schema(), &["ghost"]),
            Err(riff_result::Error::SchemaError(_))
        ));
    }

    #[test]
    fn non_orderable_indexed_type_rejected() {
        let schema = vec![Field::new("flag", ScalarType::Boolean, true)];
        assert!(matches!(
            TypeDescription::new(&schema, &["flag"]),
            Err(riff_result::Error::SchemaError(_))
        ));
    }

    #[test]
    fn from_specs_revalidates() {
        let td = TypeDescription::new(&schema(), &["col2"]).unwrap();
        let rebuilt = TypeDescription::from_specs(td.specs().to_vec()).unwrap();
        assert_eq!(rebuilt, td);

        let broken = vec![
            TypeSpec::new("a", ScalarType::Int, true, false, 0, 0),
            TypeSpec::new("b", ScalarType::Int, true, true, 1, 1),
        ];
        assert!(TypeDescription::from_specs(broken).is_err());
    }
}
