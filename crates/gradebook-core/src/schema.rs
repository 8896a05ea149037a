//! Schema descriptors
//!
//! One static `Schema` per entity type: the physical table, the ordered
//! attribute list and the relational attributes. Attribute order is the
//! column order of every `SELECT` the statement builder emits and the order
//! in which hydration consumes a result row, so the two can never disagree.
//!
//! Naming rules shared by the builder and hydration:
//! - the logical attribute `pk` is stored in the physical column `id`
//! - a relational attribute `x` is stored in the column `x_id`

/// Logical name of the identity attribute
pub const PK: &str = "pk";

/// Physical name of the identity column
pub const ID_COLUMN: &str = "id";

/// Separator between a relation name and a column in condition keys
/// (`school_class__name`)
pub const RELATED_SEPARATOR: &str = "__";

/// A relational attribute and the entity type it references
#[derive(Debug)]
pub struct Relation {
    pub attribute: &'static str,
    pub target: &'static Schema,
}

/// Static metadata for one entity type
#[derive(Debug)]
pub struct Schema {
    /// Entity type name, used in errors and logs
    pub entity: &'static str,
    /// Physical table name
    pub table: &'static str,
    /// Ordered attributes, `pk` first when the table has an identity
    pub attributes: &'static [&'static str],
    /// Relational attributes in declaration order
    pub relations: &'static [Relation],
}

impl Schema {
    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes.contains(&attribute)
    }

    pub fn has_identity(&self) -> bool {
        self.has_attribute(PK)
    }

    pub fn relation(&self, attribute: &str) -> Option<&Relation> {
        self.relations.iter().find(|r| r.attribute == attribute)
    }

    pub fn is_relational(&self, attribute: &str) -> bool {
        self.relation(attribute).is_some()
    }

    /// Physical column backing an attribute of this schema
    pub fn column_for(&self, attribute: &str) -> String {
        if attribute == PK {
            ID_COLUMN.to_string()
        } else if self.is_relational(attribute) {
            format!("{}_id", attribute)
        } else {
            attribute.to_string()
        }
    }

    /// Attributes written by INSERT/UPDATE: everything except `pk`
    pub fn writable_attributes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.attributes.iter().copied().filter(|a| *a != PK)
    }

    /// Number of columns one row of a one-hop fetch carries
    pub fn fetch_width(&self) -> usize {
        self.attributes.len()
            + self
                .relations
                .iter()
                .map(|r| r.target.attributes.len())
                .sum::<usize>()
    }
}
