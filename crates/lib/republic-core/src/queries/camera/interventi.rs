//! Floor speeches grouped by debate topic.

use republic_sparql::{Filter, Pattern, QueryError, QueryOptions, Term, WhereClause};
use serde::Deserialize;

use crate::institution::{CAMERA, CURRENT_LEGISLATURE, clamp_limit};
use crate::queries::common::{given, in_legislature, require};

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechSearch {
    pub argomento: String,
    #[serde(default)]
    pub legislatura: Option<u32>,
    #[serde(default)]
    pub cognome: Option<String>,
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
}

fn debates(params: &SpeechSearch, speaker: &'static str) -> Result<WhereClause, QueryError> {
    let topic = require(&params.argomento, "argomento")?;
    let legislature = params.legislatura.unwrap_or(CURRENT_LEGISLATURE);
    Ok(WhereClause::new()
        .triples("?dibattito a ocd:dibattito .")
        .pattern(in_legislature(&CAMERA, "?dibattito", legislature)?)
        .triples(
            "?dibattito ocd:rif_discussione ?discussione .
?discussione ocd:rif_seduta ?seduta .
?seduta dc:date ?data ;
  dc:title ?titoloSeduta .
?discussione rdfs:label ?argomento .",
        )
        .filter(Filter::regex("?argomento", topic))
        .triples("?discussione ocd:rif_intervento ?intervento .")
        .filters(
            given(params.cognome.as_deref())
                .map(|value| Filter::regex_on(Term::var("?cognome").str(), value)),
        )
        .filters(
            given(params.nome.as_deref())
                .map(|value| Filter::regex_on(Term::var("?nome").str(), value)),
        )
        .pattern(
            Pattern::new(
                "?intervento ocd:rif_deputato $speaker .
$speaker foaf:firstName ?nome ;
  foaf:surname ?cognome .",
            )
            .bind("speaker", Term::var(speaker)),
        ))
}

/// Deputies who spoke in debates matching a topic.
///
/// # Errors
/// Fails for a blank topic or an unsupported legislature.
pub fn search_speeches(params: &SpeechSearch) -> Result<String, QueryError> {
    let body = debates(params, "?deputato")?;
    Ok(CAMERA.select(
        "?deputato ?cognome ?nome ?argomento ?titoloSeduta ?data",
        &body,
        &QueryOptions::new()
            .with_order_by("DESC(?data) ?cognome ?nome")
            .with_limit(clamp_limit(params.limit, 20)),
    ))
}

/// Speeches on a topic with a link to the stenographic text.
///
/// # Errors
/// Fails for a blank topic or an unsupported legislature.
pub fn speeches_by_topic(params: &SpeechSearch) -> Result<String, QueryError> {
    let body = debates(params, "?deputatoId")?
        .triples("?seduta ocd:rif_assemblea ?assemblea .\n?intervento dc:relation ?testo .");
    Ok(CAMERA.select(
        "?deputatoId ?cognome ?nome ?argomento ?titoloSeduta ?data ?testo",
        &body,
        &QueryOptions::new()
            .with_order_by("?cognome ?nome ?data")
            .with_limit(clamp_limit(params.limit, 50)),
    ))
}
