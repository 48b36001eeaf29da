//! Static ontology mappings for the two chambers.
//!
//! The query catalogs read everything that differs between Camera and Senato
//! from an [`InstitutionConfig`]: class and property names, how a
//! legislature is written, how dates compare and how literals are quoted.

use std::fmt;

use chrono::NaiveDate;
use republic_sparql::{
    Filter,
    Iri,
    Op,
    Prefix,
    QueryBuilder,
    QueryError,
    QueryOptions,
    QuoteStyle,
    Term,
    WhereClause,
};
use serde::{Deserialize, Serialize};

pub const CURRENT_LEGISLATURE: u32 = 19;
pub const CURRENT_LEGISLATURE_START: &str = "2022-10-13";

/// Row caps applied to generated queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryLimits {
    pub default: u32,
    pub max: u32,
    pub members: u32,
    pub acts: u32,
    pub votings: u32,
}

pub const QUERY_LIMITS: QueryLimits = QueryLimits {
    default: 100,
    max: 1000,
    members: 500,
    acts: 100,
    votings: 50,
};

/// Requested limit or `default`, capped at [`QueryLimits::max`].
#[must_use]
pub fn clamp_limit(requested: Option<u32>, default: u32) -> u32 {
    requested.unwrap_or(default).clamp(1, QUERY_LIMITS.max)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Institution {
    Camera,
    Senato,
}

impl Institution {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Camera => "camera",
            Self::Senato => "senato",
        }
    }

    #[must_use]
    pub const fn config(self) -> &'static InstitutionConfig {
        match self {
            Self::Camera => &CAMERA,
            Self::Senato => &SENATO,
        }
    }
}

impl fmt::Display for Institution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a legislature number appears in the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegislatureFormat {
    /// `<{base}{n}>`
    Uri { base: &'static str },
    Integer,
}

/// How date literals are stored and compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    /// `YYYYMMDD` strings compared lexically.
    Compact,
    /// `YYYY-MM-DD` compared through `xsd:date` casts.
    Iso,
}

impl DateStyle {
    const fn format(self) -> &'static str {
        match self {
            Self::Compact => "%Y%m%d",
            Self::Iso => "%Y-%m-%d",
        }
    }
}

/// Which node carries the legislature property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegislatureAnchor {
    /// The member resource is scoped to one legislature.
    Member,
    /// Each mandate names its legislature.
    Mandate,
}

/// Class and property names for the concepts shared by both chambers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ontology {
    /// Variable used for the member in generated queries.
    pub member_var: &'static str,
    pub member_class: &'static str,
    pub surname: &'static str,
    pub first_name: &'static str,
    pub mandate_relation: &'static str,
    pub mandate_class: &'static str,
    pub mandate_start: &'static str,
    pub mandate_end: &'static str,
    pub legislature: &'static str,
    pub act_class: &'static str,
    pub group_class: &'static str,
    pub group_membership: &'static str,
    pub group_membership_class: &'static str,
    pub group_relation: &'static str,
    pub voting_class: &'static str,
}

/// Immutable per-chamber configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstitutionConfig {
    pub institution: Institution,
    pub name: &'static str,
    pub short_name: &'static str,
    pub endpoint: &'static str,
    pub namespace: &'static str,
    pub base_uri: &'static str,
    pub license: &'static str,
    pub docs: &'static str,
    pub ontology: Ontology,
    pub legislature_format: LegislatureFormat,
    pub legislature_anchor: LegislatureAnchor,
    pub date_style: DateStyle,
    pub quote: QuoteStyle,
    pub prefixes: &'static [Prefix],
}

const FOAF: Prefix = Prefix::new("foaf", "http://xmlns.com/foaf/0.1/");
const RDFS: Prefix = Prefix::new("rdfs", "http://www.w3.org/2000/01/rdf-schema#");
const DC: Prefix = Prefix::new("dc", "http://purl.org/dc/elements/1.1/");
const DCTERMS: Prefix = Prefix::new("dcterms", "http://purl.org/dc/terms/");
const XSD: Prefix = Prefix::new("xsd", "http://www.w3.org/2001/XMLSchema#");
const BIO: Prefix = Prefix::new("bio", "http://purl.org/vocab/bio/0.1/");
const OCD: Prefix = Prefix::new("ocd", "http://dati.camera.it/ocd/");
const OSR: Prefix = Prefix::new("osr", "http://dati.senato.it/osr/");

pub const CAMERA: InstitutionConfig = InstitutionConfig {
    institution: Institution::Camera,
    name: "Camera dei Deputati",
    short_name: "Camera",
    endpoint: "https://dati.camera.it/sparql",
    namespace: "ocd",
    base_uri: "http://dati.camera.it/ocd/",
    license: "CC BY 4.0",
    docs: "https://dati.camera.it/ocd-ontologia-della-camera-dei-deputati",
    ontology: Ontology {
        member_var: "?deputato",
        member_class: "ocd:deputato",
        surname: "foaf:surname",
        first_name: "foaf:firstName",
        mandate_relation: "ocd:rif_mandatoCamera",
        mandate_class: "ocd:mandatoCamera",
        mandate_start: "ocd:startDate",
        mandate_end: "ocd:endDate",
        legislature: "ocd:rif_leg",
        act_class: "ocd:atto",
        group_class: "ocd:gruppoParlamentare",
        group_membership: "ocd:aderisce",
        group_membership_class: "ocd:adesioneGruppo",
        group_relation: "ocd:rif_gruppoParlamentare",
        voting_class: "ocd:votazione",
    },
    legislature_format: LegislatureFormat::Uri {
        base: "http://dati.camera.it/ocd/legislatura.rdf/repubblica_",
    },
    legislature_anchor: LegislatureAnchor::Member,
    date_style: DateStyle::Compact,
    quote: QuoteStyle::Single,
    prefixes: &[OCD, DC, DCTERMS, FOAF, RDFS, BIO, XSD],
};

pub const SENATO: InstitutionConfig = InstitutionConfig {
    institution: Institution::Senato,
    name: "Senato della Repubblica",
    short_name: "Senato",
    endpoint: "https://dati.senato.it/sparql",
    namespace: "osr",
    base_uri: "http://dati.senato.it/osr/",
    license: "CC BY 3.0",
    docs: "https://dati.senato.it/DatiSenato/browse/21",
    ontology: Ontology {
        member_var: "?senatore",
        member_class: "osr:Senatore",
        surname: "foaf:lastName",
        first_name: "foaf:firstName",
        mandate_relation: "osr:mandato",
        mandate_class: "ocd:mandatoSenato",
        mandate_start: "osr:inizio",
        mandate_end: "osr:fine",
        legislature: "osr:legislatura",
        act_class: "osr:Ddl",
        group_class: "ocd:gruppoParlamentare",
        group_membership: "ocd:aderisce",
        group_membership_class: "ocd:adesioneGruppo",
        group_relation: "osr:gruppo",
        voting_class: "osr:Votazione",
    },
    legislature_format: LegislatureFormat::Integer,
    legislature_anchor: LegislatureAnchor::Mandate,
    date_style: DateStyle::Iso,
    quote: QuoteStyle::Double,
    prefixes: &[OSR, OCD, FOAF, RDFS, DC, XSD, BIO],
};

impl InstitutionConfig {
    #[must_use]
    pub const fn builder(&self) -> QueryBuilder {
        QueryBuilder::new(self.prefixes).with_quote_style(self.quote)
    }

    /// Renders a SELECT with this chamber's prefixes and quote style.
    #[must_use]
    pub fn select(&self, select: &str, body: &WhereClause, options: &QueryOptions) -> String {
        self.builder().select(select, body, options)
    }

    /// Legislature `n` as this chamber writes it.
    ///
    /// # Errors
    /// Returns [`QueryError::InvalidParameter`] outside `1..=CURRENT_LEGISLATURE`.
    pub fn legislature(&self, number: u32) -> Result<Term, QueryError> {
        if !(1..=CURRENT_LEGISLATURE).contains(&number) {
            return Err(QueryError::InvalidParameter {
                name: "legislatura",
                value: number.to_string(),
            });
        }
        match self.legislature_format {
            LegislatureFormat::Uri { base } => Iri::parse(format!("{base}{number}")).map(Term::Iri),
            LegislatureFormat::Integer => Ok(Term::Integer(i64::from(number))),
        }
    }

    /// Normalizes a caller date (`YYYY-MM-DD` or `YYYYMMDD`) to this chamber's form.
    ///
    /// # Errors
    /// Returns [`QueryError::InvalidParameter`] naming `param` for unparsable dates.
    pub fn date(&self, param: &'static str, value: &str) -> Result<String, QueryError> {
        let trimmed = value.trim();
        let parsed = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y%m%d"))
            .map_err(|_| QueryError::InvalidParameter {
                name: param,
                value: value.to_string(),
            })?;
        Ok(parsed.format(self.date_style.format()).to_string())
    }

    /// Compares a date variable against a caller date.
    ///
    /// # Errors
    /// Propagates [`InstitutionConfig::date`] failures.
    pub fn date_filter(
        &self,
        var: &'static str,
        op: Op,
        param: &'static str,
        value: &str,
    ) -> Result<Filter, QueryError> {
        let date = self.date(param, value)?;
        Ok(match self.date_style {
            DateStyle::Compact => Filter::compare(Term::var(var), op, Term::literal(date)),
            DateStyle::Iso => {
                Filter::compare(Term::var(var).str().date(), op, Term::literal(date).date())
            }
        })
    }

    /// `from <= var <= to`, each side optional; params are named `data_da`/`data_a`.
    ///
    /// # Errors
    /// Propagates [`InstitutionConfig::date`] failures.
    pub fn date_range(
        &self,
        var: &'static str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Vec<Filter>, QueryError> {
        let mut filters = Vec::new();
        if let Some(from) = from {
            filters.push(self.date_filter(var, Op::Ge, "data_da", from)?);
        }
        if let Some(to) = to {
            filters.push(self.date_filter(var, Op::Le, "data_a", to)?);
        }
        Ok(filters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legislature_strategy_differs_per_chamber() {
        let camera = CAMERA.legislature(19).expect("valid legislature");
        assert_eq!(
            camera.render(CAMERA.quote),
            "<http://dati.camera.it/ocd/legislatura.rdf/repubblica_19>"
        );
        let senato = SENATO.legislature(18).expect("valid legislature");
        assert_eq!(senato.render(SENATO.quote), "18");
        assert!(SENATO.legislature(0).is_err());
        assert!(CAMERA.legislature(CURRENT_LEGISLATURE + 1).is_err());
    }

    #[test]
    fn dates_are_normalized_to_the_chamber_format() {
        assert_eq!(CAMERA.date("data_da", "2024-03-01").as_deref(), Ok("20240301"));
        assert_eq!(SENATO.date("data_da", "20240301").as_deref(), Ok("2024-03-01"));
        assert_eq!(
            SENATO.date("data_a", "31/12/2024"),
            Err(QueryError::InvalidParameter {
                name: "data_a",
                value: "31/12/2024".to_string(),
            })
        );
    }

    #[test]
    fn date_filters_use_string_or_cast_comparison() {
        let camera = CAMERA
            .date_filter("?data", Op::Ge, "data_da", "2024-01-01")
            .expect("valid date");
        assert_eq!(camera.render(CAMERA.quote), "FILTER(?data >= '20240101')");

        let senato = SENATO
            .date_range("?dataPres", Some("2024-01-01"), Some("2024-06-30"))
            .expect("valid dates");
        let rendered: Vec<String> = senato.iter().map(|f| f.render(SENATO.quote)).collect();
        assert_eq!(
            rendered,
            [
                "FILTER(xsd:date(STR(?dataPres)) >= xsd:date(\"2024-01-01\"))",
                "FILTER(xsd:date(STR(?dataPres)) <= xsd:date(\"2024-06-30\"))",
            ]
        );
    }

    #[test]
    fn limits_are_clamped() {
        assert_eq!(clamp_limit(None, QUERY_LIMITS.votings), 50);
        assert_eq!(clamp_limit(Some(5000), QUERY_LIMITS.default), 1000);
        assert_eq!(clamp_limit(Some(0), QUERY_LIMITS.default), 1);
    }

    #[test]
    fn prefix_blocks_start_with_the_chamber_namespace() {
        assert!(CAMERA.builder().prefixes().starts_with("PREFIX ocd:"));
        assert!(SENATO.builder().prefixes().starts_with("PREFIX osr:"));
    }
}
