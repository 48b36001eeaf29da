//! Query catalog for the Camera dei Deputati (`ocd` ontology).

pub mod atti;
pub mod deputati;
pub mod interventi;
pub mod organi;
pub mod votazioni;
