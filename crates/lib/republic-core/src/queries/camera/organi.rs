//! Groups, organs, governments and the offices held in them.

use republic_sparql::{Filter, Pattern, QueryError, QueryOptions, Term, WhereClause};
use serde::Deserialize;

use crate::institution::{CAMERA, CURRENT_LEGISLATURE, clamp_limit};
use crate::queries::common::{given, in_legislature};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LegislatureScope {
    pub legislatura: Option<u32>,
}

impl LegislatureScope {
    fn legislature(&self) -> u32 {
        self.legislatura.unwrap_or(CURRENT_LEGISLATURE)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrganSearch {
    pub legislatura: Option<u32>,
    pub tipo: Option<String>,
    pub solo_attivi: bool,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GovernmentSearch {
    pub solo_in_carica: bool,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GovernmentLookup {
    pub uri: String,
}

/// Deputies of a legislature joined to their person record, bound to `?d`.
fn sitting_deputies(legislature: u32) -> Result<WhereClause, QueryError> {
    Ok(WhereClause::new()
        .triples(
            "?persona ocd:rif_mandatoCamera ?mandato ;
  a foaf:Person .
?d a ocd:deputato ;
  ocd:aderisce ?aderisce ;
  ocd:rif_mandatoCamera ?mandato .",
        )
        .pattern(in_legislature(&CAMERA, "?d", legislature)?)
        .triples(
            "?d foaf:surname ?cognome ;
  foaf:gender ?genere ;
  foaf:firstName ?nome .",
        ))
}

/// Parliamentary groups of a legislature.
///
/// # Errors
/// Fails for legislatures outside the supported range.
pub fn parliamentary_groups(params: &LegislatureScope) -> Result<String, QueryError> {
    let body = WhereClause::new()
        .triples("?gruppo a ocd:gruppoParlamentare ;\n  dc:title ?nomeUfficiale .")
        .pattern(in_legislature(&CAMERA, "?gruppo", params.legislature())?)
        .optional(WhereClause::new().triples("?gruppo dcterms:alternative ?sigla ."))
        .optional(WhereClause::new().triples("?gruppo ocd:startDate ?startDate ."))
        .optional(WhereClause::new().triples("?gruppo ocd:endDate ?endDate ."));

    Ok(CAMERA.select(
        "?gruppo ?nomeUfficiale ?sigla ?startDate ?endDate",
        &body,
        &QueryOptions::new().with_order_by("?nomeUfficiale"),
    ))
}

/// Offices (leader, secretary, ...) inside parliamentary groups.
///
/// # Errors
/// Fails for legislatures outside the supported range.
pub fn group_positions(params: &LegislatureScope) -> Result<String, QueryError> {
    let body = sitting_deputies(params.legislature())?
        .triples(
            "?d ocd:rif_incarico ?incaricoUri .
?incaricoUri ocd:rif_gruppoParlamentare ?organoUri ;
  ocd:ruolo ?incarico .",
        )
        .optional(WhereClause::new().triples("?incaricoUri ocd:endDate ?fineIncarico ."))
        .optional(WhereClause::new().triples("?incaricoUri ocd:startDate ?inizioIncarico ."))
        .triples("?organoUri dc:title ?organo .");

    Ok(CAMERA.select(
        "?d ?cognome ?nome ?genere ?incarico ?organo ?inizioIncarico ?fineIncarico",
        &body,
        &QueryOptions::new().with_order_by("?d").with_limit(10_000),
    ))
}

/// Commissions and other organs, optionally only those still active.
///
/// # Errors
/// Fails for legislatures outside the supported range.
pub fn organs(params: &OrganSearch) -> Result<String, QueryError> {
    let legislature = params.legislatura.unwrap_or(CURRENT_LEGISLATURE);
    let mut body = WhereClause::new()
        .triples("?organo a ocd:organo ;\n  dc:title ?nome .")
        .pattern(in_legislature(&CAMERA, "?organo", legislature)?)
        .optional(WhereClause::new().triples("?organo dc:type ?tipo ."))
        .optional(WhereClause::new().triples("?organo ocd:startDate ?startDate ."))
        .optional(WhereClause::new().triples("?organo ocd:endDate ?endDate ."))
        .filters(given(params.tipo.as_deref()).map(|value| Filter::regex("?tipo", value)));
    if params.solo_attivi {
        body = body.minus(WhereClause::new().triples("?organo ocd:endDate ?fine ."));
    }

    Ok(CAMERA.select(
        "?organo ?nome ?tipo ?startDate ?endDate",
        &body,
        &QueryOptions::new()
            .with_order_by("?nome")
            .with_limit(clamp_limit(params.limit, 100)),
    ))
}

/// Offices held by deputies in parliamentary organs, with biography.
///
/// # Errors
/// Fails for legislatures outside the supported range.
pub fn organ_positions(params: &LegislatureScope) -> Result<String, QueryError> {
    let body = sitting_deputies(params.legislature())?
        .optional(WhereClause::new().triples("?d dc:description ?info ."))
        .optional(WhereClause::new().triples(
            "?persona bio:Birth ?nascita .
?nascita bio:date ?dataNascita ;
  ocd:rif_luogo ?luogoNascitaUri .
?luogoNascitaUri dc:title ?luogoNascita .",
        ))
        .triples(
            "?mandato ocd:rif_elezione ?elezione .
?elezione dc:coverage ?collegio .
?d ocd:rif_ufficioParlamentare ?ufficioUri .
?ufficioUri ocd:rif_organo ?organoUri ;
  ocd:carica ?ufficio .",
        )
        .optional(WhereClause::new().triples("?ufficioUri ocd:endDate ?fineUfficio ."))
        .optional(WhereClause::new().triples("?ufficioUri ocd:startDate ?inizioUfficio ."))
        .triples("?organoUri dc:title ?organo .");

    Ok(CAMERA.select(
        "?d ?cognome ?nome ?info ?dataNascita ?luogoNascita ?genere ?ufficio ?organo ?inizioUfficio ?fineUfficio ?collegio",
        &body,
        &QueryOptions::new().with_order_by("?d").with_limit(10_000),
    ))
}

/// Governments of the Republic, newest first.
#[must_use]
pub fn governments(params: &GovernmentSearch) -> String {
    let mut body = WhereClause::new()
        .triples(
            "?governo a ocd:governo ;
  dc:title ?nome ;
  ocd:startDate ?startDate .",
        )
        .optional(WhereClause::new().triples("?governo ocd:endDate ?endDate ."));
    if params.solo_in_carica {
        body = body.minus(WhereClause::new().triples("?governo ocd:endDate ?fine ."));
    }

    CAMERA.select(
        "?governo ?nome ?startDate ?endDate",
        &body,
        &QueryOptions::new()
            .with_order_by("?startDate")
            .descending()
            .with_limit(clamp_limit(params.limit, 50)),
    )
}

/// Ministers, deputy ministers and undersecretaries of one government.
///
/// # Errors
/// Fails when `uri` is not a safe IRI.
pub fn government_members(params: &GovernmentLookup) -> Result<String, QueryError> {
    let body = WhereClause::new()
        .pattern(
            Pattern::new(
                "?membroGoverno ocd:rif_governo $government ;
  ocd:rif_persona ?persona ;
  ocd:membroGoverno ?carica ;
  ocd:startDate ?startDate .",
            )
            .bind("government", Term::iri(&params.uri)?),
        )
        .triples(
            "?persona foaf:firstName ?nome ;
  foaf:surname ?cognome .",
        )
        .optional(WhereClause::new().triples(
            "?membroGoverno ocd:rif_organoGoverno ?organo .
?organo dc:title ?organoGoverno .",
        ))
        .optional(WhereClause::new().triples("?membroGoverno dc:description ?delega ."))
        .optional(WhereClause::new().triples("?membroGoverno ocd:endDate ?endDate ."));

    Ok(CAMERA.select(
        "?persona ?nome ?cognome ?carica ?organoGoverno ?delega ?startDate ?endDate",
        &body,
        &QueryOptions::new().with_order_by("?cognome ?nome"),
    ))
}
