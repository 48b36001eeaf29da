//! Query catalog for the Senato della Repubblica (`osr` ontology).

pub mod commissioni;
pub mod ddl;
pub mod gruppi;
pub mod senatori;
pub mod votazioni;
