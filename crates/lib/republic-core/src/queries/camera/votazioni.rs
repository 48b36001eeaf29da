//! Floor votes and how each deputy voted.

use republic_sparql::{Filter, Pattern, QueryError, QueryOptions, Term, WhereClause};
use serde::Deserialize;

use crate::institution::{CAMERA, CURRENT_LEGISLATURE, QUERY_LIMITS, clamp_limit};
use crate::queries::camera::atti::flag;
use crate::queries::common::{given, in_legislature, require};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VotingSearch {
    pub atto_uri: Option<String>,
    pub data_da: Option<String>,
    pub data_a: Option<String>,
    pub approvato: Option<bool>,
    pub finale: Option<bool>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoteExpressions {
    pub data: String,
    pub numero: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeputyVoteStats {
    pub cognome: String,
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub legislatura: Option<u32>,
    #[serde(default)]
    pub tipo_voto: Option<String>,
    #[serde(default)]
    pub data_da: Option<String>,
    #[serde(default)]
    pub data_a: Option<String>,
}

/// Escapes regex metacharacters so caller text matches literally.
fn regex_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if "\\^$.|?*+()[]{}".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Anchored prefix regex, used for name lookups on vote records.
fn starts_with(var: &'static str, value: &str) -> Filter {
    Filter::regex(var, format!("^{}", regex_literal(value)))
}

/// Votes, newest first, optionally restricted to one act or a date range.
///
/// # Errors
/// Fails for an unsafe act URI or malformed dates.
pub fn votings(params: &VotingSearch) -> Result<String, QueryError> {
    let mut body = WhereClause::new().triples(
        "?votazione a ocd:votazione ;
  dc:date ?data .",
    );
    if let Some(act) = given(params.atto_uri.as_deref()) {
        body = body.pattern(
            Pattern::new("?votazione ocd:rif_attoCamera $act .").bind("act", Term::iri(act)?),
        );
    }
    let body = body
        .optional(WhereClause::new().triples("?votazione dc:title ?titolo ."))
        .optional(WhereClause::new().triples("?votazione dc:description ?descrizione ."))
        .optional(WhereClause::new().triples("?votazione ocd:votanti ?votanti ."))
        .optional(WhereClause::new().triples("?votazione ocd:favorevoli ?favorevoli ."))
        .optional(WhereClause::new().triples("?votazione ocd:contrari ?contrari ."))
        .optional(WhereClause::new().triples("?votazione ocd:astenuti ?astenuti ."))
        .optional(WhereClause::new().triples("?votazione ocd:approvato ?approvato ."))
        .optional(WhereClause::new().triples("?votazione ocd:votazioneFinale ?votazioneFinale ."))
        .filters(CAMERA.date_range(
            "?data",
            given(params.data_da.as_deref()),
            given(params.data_a.as_deref()),
        )?)
        .filters(params.approvato.map(|value| Filter::equals("?approvato", flag(value))))
        .filters(params.finale.map(|value| Filter::equals("?votazioneFinale", flag(value))));

    Ok(CAMERA.select(
        "?votazione ?data ?titolo ?descrizione ?votanti ?favorevoli ?contrari ?astenuti ?approvato ?votazioneFinale",
        &body,
        &QueryOptions::new()
            .with_order_by("?data")
            .descending()
            .with_limit(clamp_limit(params.limit, 20)),
    ))
}

/// How every deputy voted in the vote numbered `numero` on `data`.
///
/// # Errors
/// Fails for a blank vote number or a malformed date.
pub fn vote_expressions(params: &VoteExpressions) -> Result<String, QueryError> {
    let date = CAMERA.date("data", &params.data)?;
    let number = require(&params.numero, "numero")?;
    let body = WhereClause::new()
        .pattern(
            Pattern::new(
                "?votazione a ocd:votazione ;
  dc:date $date ;
  rdfs:label ?titolo ;
  dc:description ?descrizione ;
  dc:identifier ?numeroVotazione .",
            )
            .bind("date", Term::literal(date)),
        )
        .filter(Filter::regex("?numeroVotazione", regex_literal(number)).case_sensitive())
        .triples(
            "?voto a ocd:voto ;
  ocd:rif_votazione ?votazione ;
  dc:type ?espressione ;
  ocd:rif_deputato ?deputato .",
        )
        .optional(WhereClause::new().triples("?voto dc:description ?infoAssenza ."))
        .triples(
            "?deputato foaf:surname ?cognome ;
  foaf:firstName ?nome .",
        );

    Ok(CAMERA.select(
        "?votazione ?titolo ?descrizione ?numeroVotazione ?cognome ?nome ?espressione ?infoAssenza ?deputato",
        &body,
        &QueryOptions::new().with_order_by("?cognome"),
    ))
}

/// Vote counts per expression (favorevole, contrario, ...) for a deputy.
///
/// # Errors
/// Fails for a blank surname, an unsupported legislature or malformed dates.
pub fn deputy_vote_stats(params: &DeputyVoteStats) -> Result<String, QueryError> {
    let surname = require(&params.cognome, "cognome")?;
    let legislature = params.legislatura.unwrap_or(CURRENT_LEGISLATURE);
    let body = WhereClause::new()
        .triples(
            "?deputato foaf:surname ?cognome ;
  foaf:firstName ?nome .",
        )
        .pattern(in_legislature(&CAMERA, "?deputato", legislature)?)
        .filter(starts_with("?cognome", surname))
        .filters(given(params.nome.as_deref()).map(|value| starts_with("?nome", value)))
        .triples(
            "?votazione a ocd:votazione ;
  dc:date ?data .",
        )
        .filters(CAMERA.date_range(
            "?data",
            given(params.data_da.as_deref()),
            given(params.data_a.as_deref()),
        )?)
        .triples(
            "?voto a ocd:voto ;
  ocd:rif_votazione ?votazione ;
  dc:type ?espressione ;
  ocd:rif_deputato ?deputato .",
        )
        .filters(given(params.tipo_voto.as_deref()).map(|value| Filter::regex("?espressione", value)));

    Ok(CAMERA.select(
        "?cognome ?nome ?espressione (COUNT(DISTINCT ?votazione) AS ?numero)",
        &body,
        &QueryOptions::new()
            .with_group_by("?cognome ?nome ?espressione")
            .with_order_by("DESC(?numero) ASC(?cognome) ASC(?nome)")
            .with_limit(QUERY_LIMITS.max),
    ))
}
