//! Parliamentary acts: search, details, iter phases and signatories.

use republic_sparql::{Filter, Pattern, QueryError, QueryOptions, Term, WhereClause};
use serde::Deserialize;

use crate::institution::{CAMERA, CURRENT_LEGISLATURE, clamp_limit};
use crate::queries::common::{given, in_legislature, name_filters, require};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ActSearch {
    pub titolo: Option<String>,
    pub tipo: Option<String>,
    pub legislatura: Option<u32>,
    pub iniziativa: Option<String>,
    pub stato: Option<String>,
    pub concluso: Option<bool>,
    pub costituzionale: Option<bool>,
    pub data_da: Option<String>,
    pub data_a: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActLookup {
    pub uri: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ActPhases {
    pub legislatura: Option<u32>,
    pub data_da: Option<String>,
    pub data_a: Option<String>,
    pub limit: Option<u32>,
}

/// Signature role on an act.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatoryRole {
    PrimoFirmatario,
    AltroFirmatario,
    #[default]
    Both,
}

impl SignatoryRole {
    const fn property(self) -> Option<&'static str> {
        match self {
            Self::PrimoFirmatario => Some("ocd:primo_firmatario"),
            Self::AltroFirmatario => Some("ocd:altro_firmatario"),
            Self::Both => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeputyActs {
    pub cognome: String,
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub legislatura: Option<u32>,
    #[serde(default)]
    pub ruolo: SignatoryRole,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// `"1"^^xsd:integer` / `"0"^^xsd:integer`, the Camera's boolean flags.
pub(crate) fn flag(value: bool) -> Term {
    Term::typed(if value { "1" } else { "0" }, "xsd:integer")
}

fn final_approval() -> WhereClause {
    WhereClause::new().triples(
        "?votazione a ocd:votazione ;
  ocd:rif_attoCamera ?atto ;
  ocd:approvato \"1\"^^xsd:integer ;
  ocd:votazioneFinale \"1\"^^xsd:integer ;
  dc:date ?dataApprovazione .",
    )
}

/// Acts filtered by title, type, initiative, iter state, flags and dates.
///
/// # Errors
/// Fails for unsupported legislatures or malformed dates.
pub fn search_acts(params: &ActSearch) -> Result<String, QueryError> {
    let legislature = params.legislatura.unwrap_or(CURRENT_LEGISLATURE);
    let mut body = WhereClause::new()
        .triples("?atto a ocd:atto .")
        .pattern(in_legislature(&CAMERA, "?atto", legislature)?)
        .triples(
            "?atto dc:identifier ?numero ;
  dc:title ?titolo ;
  dc:date ?presentazione .",
        )
        .optional(WhereClause::new().triples("?atto dc:type ?tipo ."))
        .optional(WhereClause::new().triples("?atto ocd:iniziativa ?iniziativa ."))
        .optional(WhereClause::new().triples("?atto ocd:concluso ?concluso ."))
        .optional(WhereClause::new().triples("?atto ocd:costituzionale ?costituzionale ."));
    if given(params.stato.as_deref()).is_some() {
        body = body.optional(WhereClause::new().triples(
            "?atto ocd:rif_statoIter ?statoIter .
?statoIter dc:title ?stato .",
        ));
    }
    body = body
        .filters(given(params.titolo.as_deref()).map(|value| Filter::regex("?titolo", value)))
        .filters(given(params.tipo.as_deref()).map(|value| Filter::regex("?tipo", value)))
        .filters(given(params.iniziativa.as_deref()).map(|value| Filter::regex("?iniziativa", value)))
        .filters(given(params.stato.as_deref()).map(|value| Filter::regex("?stato", value)))
        .filters(params.concluso.map(|value| Filter::equals("?concluso", flag(value))))
        .filters(
            params
                .costituzionale
                .map(|value| Filter::equals("?costituzionale", flag(value))),
        )
        .filters(CAMERA.date_range(
            "?presentazione",
            given(params.data_da.as_deref()),
            given(params.data_a.as_deref()),
        )?);

    Ok(CAMERA.select(
        "?atto ?numero ?titolo ?tipo ?iniziativa ?presentazione ?concluso ?costituzionale",
        &body,
        &QueryOptions::new()
            .with_order_by("?presentazione")
            .descending()
            .with_limit(clamp_limit(params.limit, 20)),
    ))
}

/// One act with its iter phases, first signatory and final approval date.
///
/// # Errors
/// Fails when `uri` is not a safe IRI.
pub fn act_details(params: &ActLookup) -> Result<String, QueryError> {
    let body = WhereClause::new()
        .bind(Term::iri(&params.uri)?, "?atto")
        .triples(
            "?atto a ocd:atto ;
  dc:identifier ?numero ;
  dc:title ?titolo ;
  dc:date ?presentazione .",
        )
        .optional(WhereClause::new().triples("?atto dc:type ?tipo ."))
        .optional(WhereClause::new().triples("?atto ocd:iniziativa ?iniziativa ."))
        .optional(WhereClause::new().triples("?atto ocd:concluso ?concluso ."))
        .optional(WhereClause::new().triples("?atto ocd:costituzionale ?costituzionale ."))
        .optional(WhereClause::new().triples(
            "?atto ocd:rif_statoIter ?statoIter .
?statoIter dc:title ?fase ;
  dc:date ?dataFase .",
        ))
        .optional(WhereClause::new().triples(
            "?atto ocd:primo_firmatario ?proponente .
?proponente foaf:firstName ?nomeProponente ;
  foaf:surname ?cognomeProponente .",
        ))
        .optional(final_approval());

    Ok(CAMERA.select(
        "?atto ?numero ?titolo ?tipo ?iniziativa ?presentazione ?concluso ?costituzionale ?fase ?dataFase ?proponente ?nomeProponente ?cognomeProponente ?dataApprovazione",
        &body,
        &QueryOptions::new().with_order_by("?dataFase").with_limit(100),
    ))
}

/// Acts together with every iter phase they went through.
///
/// # Errors
/// Fails for unsupported legislatures or malformed dates.
pub fn acts_with_phases(params: &ActPhases) -> Result<String, QueryError> {
    let legislature = params.legislatura.unwrap_or(CURRENT_LEGISLATURE);
    let body = WhereClause::new()
        .triples(
            "?atto a ocd:atto ;
  ocd:iniziativa ?iniziativa ;
  dc:identifier ?numero ;
  dc:date ?presentazione ;
  dc:title ?titolo ;
  ocd:rif_statoIter ?statoIter .",
        )
        .pattern(in_legislature(&CAMERA, "?atto", legislature)?)
        .triples(
            "?statoIter dc:title ?fase ;
  dc:date ?dataIter .",
        )
        .filters(CAMERA.date_range(
            "?presentazione",
            given(params.data_da.as_deref()),
            given(params.data_a.as_deref()),
        )?)
        .optional(final_approval());

    Ok(CAMERA.select(
        "?atto ?numero ?iniziativa ?presentazione ?titolo ?fase ?dataIter ?dataApprovazione",
        &body,
        &QueryOptions::new()
            .with_order_by("DESC(?presentazione) ?dataIter")
            .with_limit(clamp_limit(params.limit, 100)),
    ))
}

fn signed_act(role: &'static str) -> WhereClause {
    WhereClause::new()
        .triples(
            "?atto ?ruolo ?deputato ;
  dc:date ?data ;
  dc:identifier ?numeroAtto ;
  dc:title ?titolo .",
        )
        .optional(WhereClause::new().triples("?atto dc:type ?tipo ."))
        .filter(Filter::equals("?ruolo", Term::Name(role)))
}

/// Acts signed by a deputy as first signatory, co-signatory or either.
///
/// # Errors
/// Fails for a blank surname or an unsupported legislature.
pub fn deputy_acts(params: &DeputyActs) -> Result<String, QueryError> {
    let surname = require(&params.cognome, "cognome")?;
    let legislature = params.legislatura.unwrap_or(CURRENT_LEGISLATURE);
    let signed = match params.ruolo.property() {
        Some(role) => signed_act(role),
        None => WhereClause::new().union(vec![
            signed_act("ocd:primo_firmatario"),
            signed_act("ocd:altro_firmatario"),
        ]),
    };
    let body = signed
        .triples("?ruolo rdfs:label ?tipoRuolo .")
        .triples(
            "?deputato foaf:surname ?cognome ;
  foaf:firstName ?nome .",
        )
        .pattern(in_legislature(&CAMERA, "?deputato", legislature)?)
        .filters(name_filters(Some(surname), params.nome.as_deref()));

    Ok(CAMERA.select(
        "?atto ?tipoRuolo ?tipo ?numeroAtto ?data ?titolo ?cognome ?nome",
        &body,
        &QueryOptions::new()
            .with_order_by("DESC(?ruolo) ASC(?tipo) ASC(?data)")
            .with_limit(clamp_limit(params.limit, 100)),
    ))
}

/// First signatory and co-signatories of one act.
///
/// # Errors
/// Fails when `uri` is not a safe IRI.
pub fn act_signatories(params: &ActLookup) -> Result<String, QueryError> {
    let body = WhereClause::new()
        .pattern(Pattern::new("$act ?ruolo ?deputato .").bind("act", Term::iri(&params.uri)?))
        .filter(Filter::any(vec![
            Filter::equals("?ruolo", Term::Name("ocd:primo_firmatario")),
            Filter::equals("?ruolo", Term::Name("ocd:altro_firmatario")),
        ]))
        .triples(
            "?ruolo rdfs:label ?tipoRuolo .
?deputato foaf:surname ?cognome ;
  foaf:firstName ?nome .",
        );

    Ok(CAMERA.select(
        "?deputato ?cognome ?nome ?ruolo ?tipoRuolo",
        &body,
        &QueryOptions::new().with_order_by("DESC(?ruolo) ?cognome ?nome"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_search_uses_camera_quotes_and_limit() {
        let query = search_acts(&ActSearch {
            titolo: Some("bilancio".to_string()),
            limit: Some(5),
            ..ActSearch::default()
        })
        .expect("query should build");
        assert!(query.contains("REGEX(?titolo, 'bilancio', 'i')"));
        assert!(query.contains("ORDER BY DESC(?presentazione)"));
        assert!(query.ends_with("LIMIT 5"));
    }

    #[test]
    fn flags_and_dates_become_typed_comparisons() {
        let query = search_acts(&ActSearch {
            concluso: Some(true),
            costituzionale: Some(false),
            data_da: Some("2023-01-01".to_string()),
            ..ActSearch::default()
        })
        .expect("query should build");
        assert!(query.contains("FILTER(?concluso = \"1\"^^xsd:integer)"));
        assert!(query.contains("FILTER(?costituzionale = \"0\"^^xsd:integer)"));
        assert!(query.contains("FILTER(?presentazione >= '20230101')"));
    }

    #[test]
    fn malformed_dates_fail_before_rendering() {
        let err = acts_with_phases(&ActPhases {
            data_a: Some("yesterday".to_string()),
            ..ActPhases::default()
        })
        .expect_err("date should be rejected");
        assert!(matches!(err, QueryError::InvalidParameter { name: "data_a", .. }));
    }

    #[test]
    fn both_roles_render_a_union() {
        let query = deputy_acts(&DeputyActs {
            cognome: "Rossi".to_string(),
            nome: None,
            legislatura: Some(18),
            ruolo: SignatoryRole::Both,
            limit: None,
        })
        .expect("query should build");
        assert!(query.contains("\n  UNION\n"));
        assert!(query.contains("FILTER(?ruolo = ocd:primo_firmatario)"));
        assert!(query.contains("FILTER(?ruolo = ocd:altro_firmatario)"));
        assert!(query.contains("repubblica_18>"));
    }

    #[test]
    fn single_role_skips_the_union() {
        let query = deputy_acts(&DeputyActs {
            cognome: "Rossi".to_string(),
            nome: Some("Mario".to_string()),
            legislatura: None,
            ruolo: SignatoryRole::AltroFirmatario,
            limit: Some(10),
        })
        .expect("query should build");
        assert!(!query.contains("UNION"));
        assert!(query.contains("FILTER(REGEX(?nome, 'Mario', 'i'))"));
    }

    #[test]
    fn signatories_accept_angle_bracketed_uris() {
        let query = act_signatories(&ActLookup {
            uri: "<http://dati.camera.it/ocd/attocamera.rdf/ac19_1234>".to_string(),
        })
        .expect("query should build");
        assert!(query.contains("<http://dati.camera.it/ocd/attocamera.rdf/ac19_1234> ?ruolo ?deputato ."));
        assert!(query.contains("?ruolo = ocd:primo_firmatario || ?ruolo = ocd:altro_firmatario"));
    }
}
