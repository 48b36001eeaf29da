//! Parliamentary groups at the Senato.
//!
//! Groups are typed with the Camera class `ocd:gruppoParlamentare` and joined
//! through `ocd:aderisce`, while dates and offices use `osr` properties.

use republic_sparql::{Filter, Op, QueryError, QueryOptions, Term, WhereClause};
use serde::Deserialize;

use crate::institution::{QUERY_LIMITS, SENATO, clamp_limit};
use crate::queries::common::{given, group_membership, member_names, require};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GroupSearch {
    pub limit: Option<u32>,
}

/// Identifies a group by (partial) name or by URI.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupMembers {
    #[serde(default)]
    pub nome_gruppo: Option<String>,
    #[serde(default)]
    pub gruppo_uri: Option<String>,
    #[serde(default = "default_true")]
    pub solo_in_carica: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SenatorGroups {
    pub cognome: String,
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default = "default_true")]
    pub solo_in_carica: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupName {
    pub termine: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GroupChanges {
    pub data_da: Option<String>,
    pub data_a: Option<String>,
}

const fn default_true() -> bool {
    true
}

fn open_groups() -> WhereClause {
    WhereClause::new()
        .triples(
            "?gruppo a ocd:gruppoParlamentare ;
  osr:denominazione ?den .
?den osr:titolo ?nomeGruppo .",
        )
        .active("?den", "osr:fine")
}

fn group(name: Option<&str>, uri: Option<&str>) -> Result<WhereClause, QueryError> {
    let name = given(name);
    let uri = given(uri);
    if name.is_none() && uri.is_none() {
        return Err(QueryError::MissingParameter("nome_gruppo"));
    }
    let mut body = WhereClause::new()
        .triples(
            "?gruppo a ocd:gruppoParlamentare ;
  osr:denominazione/osr:titolo ?nomeGruppo .",
        )
        .filters(name.map(|value| Filter::regex("?nomeGruppo", value)));
    if let Some(uri) = uri {
        body = body.filter(Filter::equals("?gruppo", Term::iri(uri)?));
    }
    Ok(body)
}

fn adhesions(active_only: bool) -> WhereClause {
    let body = WhereClause::new()
        .triples(
            "?senatore ocd:aderisce ?adesione .
?adesione a ocd:adesioneGruppo ;
  osr:gruppo ?gruppo ;
  osr:inizio ?inizio .",
        )
        .optional(WhereClause::new().triples("?adesione osr:carica ?carica ."))
        .optional(WhereClause::new().triples("?adesione osr:fine ?fine ."));
    if active_only {
        body.filter(Filter::unbound("?fine"))
    } else {
        body
    }
}

/// Groups whose current denomination has no end date.
#[must_use]
pub fn active_groups(params: &GroupSearch) -> String {
    SENATO.select(
        "?gruppo ?nomeGruppo",
        &open_groups(),
        &QueryOptions::new()
            .with_order_by("?nomeGruppo")
            .with_limit(clamp_limit(params.limit, QUERY_LIMITS.default)),
    )
}

/// Senators adhering to a group.
///
/// # Errors
/// Fails when neither name nor URI is given, or the URI is unsafe.
pub fn group_composition(params: &GroupMembers) -> Result<String, QueryError> {
    let body = group(params.nome_gruppo.as_deref(), params.gruppo_uri.as_deref())?
        .append(adhesions(params.solo_in_carica))
        .triples("?senatore foaf:firstName ?nome ;\n  foaf:lastName ?cognome .");

    Ok(SENATO.select(
        "?gruppo ?nomeGruppo ?senatore ?cognome ?nome ?carica ?inizio ?fine",
        &body,
        &QueryOptions::new().with_order_by("?cognome"),
    ))
}

/// Group leaders and other office holders still in charge.
///
/// # Errors
/// Fails when neither name nor URI is given, or the URI is unsafe.
pub fn group_leadership(params: &GroupMembers) -> Result<String, QueryError> {
    let body = group(params.nome_gruppo.as_deref(), params.gruppo_uri.as_deref())?
        .triples(
            "?senatore ocd:aderisce ?adesione .
?adesione a ocd:adesioneGruppo ;
  osr:gruppo ?gruppo ;
  osr:inizio ?inizio ;
  osr:carica ?carica .",
        )
        .filter(Filter::bound("?carica"))
        .active("?adesione", "osr:fine")
        .triples("?senatore foaf:firstName ?nome ;\n  foaf:lastName ?cognome .");

    Ok(SENATO.select(
        "?gruppo ?nomeGruppo ?senatore ?cognome ?nome ?carica ?inizio",
        &body,
        &QueryOptions::new().with_order_by("?carica"),
    ))
}

/// Group history of a senator, latest first.
///
/// # Errors
/// Fails for a blank surname.
pub fn senator_groups(params: &SenatorGroups) -> Result<String, QueryError> {
    let surname = require(&params.cognome, "cognome")?;
    let body = member_names(&SENATO, Some(surname), params.nome.as_deref())
        .append(adhesions(params.solo_in_carica))
        .triples("?gruppo osr:denominazione ?den .\n?den osr:titolo ?nomeGruppo .");

    Ok(SENATO.select(
        "?senatore ?cognome ?nome ?gruppo ?nomeGruppo ?carica ?inizio ?fine",
        &body,
        &QueryOptions::new().with_order_by("?inizio").descending(),
    ))
}

/// Active groups whose name matches a search term.
///
/// # Errors
/// Fails for a blank term.
pub fn search_groups(params: &GroupName) -> Result<String, QueryError> {
    let term = require(&params.termine, "termine")?;
    Ok(SENATO.select(
        "?gruppo ?nomeGruppo",
        &open_groups().filter(Filter::regex("?nomeGruppo", term)),
        &QueryOptions::new()
            .with_order_by("?nomeGruppo")
            .with_limit(QUERY_LIMITS.default),
    ))
}

/// Current size of every active group, largest first.
#[must_use]
pub fn group_statistics() -> String {
    let body = open_groups().optional(
        WhereClause::new()
            .pattern(group_membership(&SENATO))
            .active("?adesione", "osr:fine"),
    );

    SENATO.select(
        "?gruppo ?nomeGruppo (COUNT(DISTINCT ?senatore) AS ?num_membri)",
        &body,
        &QueryOptions::new()
            .with_distinct(false)
            .with_group_by("?gruppo ?nomeGruppo")
            .with_order_by("?num_membri")
            .descending(),
    )
}

/// Senators who left a group and joined another one they still belong to.
///
/// # Errors
/// Fails for unparsable dates.
pub fn group_changes(params: &GroupChanges) -> Result<String, QueryError> {
    let body = member_names(&SENATO, None, None)
        .triples(
            "?senatore ocd:aderisce ?adesioneVecchia .
?adesioneVecchia osr:gruppo ?gruppoVecchio ;
  osr:inizio ?inizioVecchio ;
  osr:fine ?fineVecchio .
?gruppoVecchio osr:denominazione/osr:titolo ?nomeVecchio .
?senatore ocd:aderisce ?adesioneNuova .
?adesioneNuova osr:gruppo ?gruppoNuovo ;
  osr:inizio ?inizioNuovo .
?gruppoNuovo osr:denominazione/osr:titolo ?nomeNuovo .",
        )
        .filter(Filter::compare(
            Term::var("?inizioNuovo"),
            Op::Ge,
            Term::var("?fineVecchio"),
        ))
        .active("?adesioneNuova", "osr:fine")
        .filters(SENATO.date_range(
            "?fineVecchio",
            params.data_da.as_deref(),
            params.data_a.as_deref(),
        )?);

    Ok(SENATO.select(
        "?senatore ?cognome ?nome ?gruppoVecchio ?nomeVecchio ?fineVecchio ?gruppoNuovo ?nomeNuovo ?inizioNuovo",
        &body,
        &QueryOptions::new().with_order_by("?fineVecchio").descending(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composition_matches_group_names_loosely() {
        let query = group_composition(&GroupMembers {
            nome_gruppo: Some("Fratelli d'Italia".to_string()),
            gruppo_uri: None,
            solo_in_carica: true,
        })
        .expect("query should build");
        assert!(query.contains("FILTER(REGEX(?nomeGruppo, \"Fratelli d'Italia\", \"i\"))"));
        assert!(query.contains("?adesione a ocd:adesioneGruppo ;"));
        assert!(query.contains("FILTER(!bound(?fine))"));
    }

    #[test]
    fn composition_without_a_group_is_rejected() {
        let params = GroupMembers {
            nome_gruppo: None,
            gruppo_uri: None,
            solo_in_carica: false,
        };
        assert_eq!(
            group_composition(&params),
            Err(QueryError::MissingParameter("nome_gruppo"))
        );
        assert!(group_leadership(&params).is_err());
    }

    #[test]
    fn statistics_count_open_adhesions() {
        let query = group_statistics();
        assert!(query.contains("?senatore ocd:aderisce ?adesione ."));
        assert!(query.contains("FILTER(!bound(?adesione_end))"));
        assert!(query.ends_with("GROUP BY ?gruppo ?nomeGruppo\nORDER BY DESC(?num_membri)"));
    }

    #[test]
    fn changes_filter_on_the_end_of_the_old_group() {
        let query = group_changes(&GroupChanges {
            data_da: Some("2023-01-01".to_string()),
            data_a: None,
        })
        .expect("query should build");
        assert!(query.contains("FILTER(?inizioNuovo >= ?fineVecchio)"));
        assert!(query.contains("FILTER(xsd:date(STR(?fineVecchio)) >= xsd:date(\"2023-01-01\"))"));
        assert!(
            group_changes(&GroupChanges {
                data_da: None,
                data_a: Some("ieri".to_string()),
            })
            .is_err()
        );
    }

    #[test]
    fn active_groups_honour_the_limit_cap() {
        let query = active_groups(&GroupSearch { limit: Some(5000) });
        assert!(query.ends_with("LIMIT 1000"));
    }
}
