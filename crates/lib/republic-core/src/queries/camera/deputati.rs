//! Deputies: current members, biographies, mandates and government roles.

use republic_sparql::{Filter, Pattern, QueryError, QueryOptions, Term, WhereClause};
use serde::Deserialize;

use crate::institution::{CAMERA, CURRENT_LEGISLATURE, QUERY_LIMITS, clamp_limit};
use crate::queries::common::{
    MemberScope,
    given,
    group_membership,
    in_legislature,
    mandate_start,
    member_names,
    members,
    require,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeputySearch {
    pub nome: Option<String>,
    pub cognome: Option<String>,
    pub legislatura: Option<u32>,
    pub gruppo: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeputyLookup {
    pub uri: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeputyMandates {
    pub cognome: String,
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub legislatura: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeputiesByGroup {
    pub gruppo: String,
    #[serde(default)]
    pub legislatura: Option<u32>,
    #[serde(default = "default_true")]
    pub solo_in_carica: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GovernmentRoles {
    pub legislatura: Option<u32>,
    pub cognome: Option<String>,
    pub nome: Option<String>,
}

const fn default_true() -> bool {
    true
}

fn current_group() -> WhereClause {
    WhereClause::new()
        .pattern(group_membership(&CAMERA))
        .triples(
            "?gruppo dcterms:alternative ?sigla ;
  dc:title ?nomeGruppo .",
        )
        .minus(WhereClause::new().triples("?adesione ocd:endDate ?fineAdesione ."))
}

fn birth(person: &'static str) -> WhereClause {
    WhereClause::new().pattern(
        Pattern::new(
            "$person bio:Birth ?nascita .
?nascita bio:date ?dataNascita ;
  ocd:rif_luogo ?luogoNascitaUri .
?luogoNascitaUri dc:title ?luogoNascita .",
        )
        .bind("person", Term::var(person)),
    )
}

/// Sitting deputies with constituency, group and birth data.
///
/// # Errors
/// Fails for legislatures outside the supported range.
pub fn search_deputies(params: &DeputySearch) -> Result<String, QueryError> {
    let scope = MemberScope {
        cognome: params.cognome.as_deref(),
        nome: params.nome.as_deref(),
        legislatura: Some(params.legislatura.unwrap_or(CURRENT_LEGISLATURE)),
        active_only: true,
    };
    let body = members(&CAMERA, &scope)?
        .triples(
            "?deputato foaf:gender ?genere .
?mandato ocd:rif_elezione ?elezione .",
        )
        .optional(WhereClause::new().triples("?elezione dc:coverage ?collegio ."))
        .optional(current_group())
        .optional(
            WhereClause::new()
                .triples(
                    "?persona a foaf:Person ;
  ocd:rif_mandatoCamera ?mandato .",
                )
                .append(birth("?persona")),
        )
        .filters(given(params.gruppo.as_deref()).map(|group| Filter::regex("?nomeGruppo", group)));

    Ok(CAMERA.select(
        "?deputato ?cognome ?nome ?genere ?dataNascita ?luogoNascita ?collegio ?nomeGruppo ?sigla",
        &body,
        &QueryOptions::new()
            .with_order_by("?cognome ?nome")
            .with_limit(clamp_limit(params.limit, QUERY_LIMITS.default)),
    ))
}

/// Biography, election, group and committee memberships of one deputy.
///
/// # Errors
/// Fails when `uri` is not a safe IRI.
pub fn deputy_details(params: &DeputyLookup) -> Result<String, QueryError> {
    let deputy = Term::iri(&params.uri)?;
    let body = WhereClause::new()
        .bind(deputy, "?deputato")
        .triples(
            "?deputato a ocd:deputato ;
  ocd:rif_persona ?persona ;
  foaf:surname ?cognome ;
  foaf:gender ?genere ;
  foaf:firstName ?nome .",
        )
        .optional(WhereClause::new().triples("?deputato dc:description ?info ."))
        .optional(birth("?persona"))
        .optional(
            WhereClause::new()
                .triples(
                    "?deputato ocd:rif_mandatoCamera ?mandato .
?mandato ocd:rif_elezione ?elezione .",
                )
                .optional(WhereClause::new().triples("?elezione dc:coverage ?collegio ."))
                .optional(WhereClause::new().triples("?elezione ocd:lista ?lista .")),
        )
        .optional(current_group())
        .optional(
            WhereClause::new()
                .triples(
                    "?deputato ocd:membro ?membro .
?membro ocd:rif_organo ?organo .
?organo dc:title ?commissione .",
                )
                .optional(WhereClause::new().triples("?membro ocd:ruolo ?ruoloCommissione ."))
                .minus(WhereClause::new().triples("?membro ocd:endDate ?fineMembership .")),
        );

    Ok(CAMERA.select(
        "?deputato ?persona ?cognome ?nome ?genere ?info ?dataNascita ?luogoNascita ?collegio ?lista ?nomeGruppo ?sigla ?commissione ?ruoloCommissione",
        &body,
        &QueryOptions::new().with_limit(10),
    ))
}

/// Mandate history of deputies matching a surname.
///
/// # Errors
/// Fails for a blank surname or an unsupported legislature.
pub fn deputy_mandates(params: &DeputyMandates) -> Result<String, QueryError> {
    let scope = MemberScope {
        cognome: Some(require(&params.cognome, "cognome")?),
        nome: params.nome.as_deref(),
        legislatura: Some(params.legislatura.unwrap_or(CURRENT_LEGISLATURE)),
        active_only: false,
    };
    let body = members(&CAMERA, &scope)?
        .triples("?mandato ocd:rif_elezione ?elezione .")
        .optional(WhereClause::new().pattern(mandate_start(&CAMERA)))
        .optional(WhereClause::new().triples("?mandato ocd:endDate ?fineMandato ."))
        .optional(WhereClause::new().triples("?mandato ocd:convalidaMandato ?validazione ."))
        .optional(WhereClause::new().triples("?elezione dc:coverage ?collegio ."))
        .optional(WhereClause::new().triples("?elezione ocd:lista ?lista ."));

    Ok(CAMERA.select(
        "?deputato ?cognome ?nome ?mandato ?inizioMandato ?fineMandato ?validazione ?collegio ?lista",
        &body,
        &QueryOptions::new().with_order_by("?inizioMandato"),
    ))
}

/// Deputies adhering to a parliamentary group.
///
/// # Errors
/// Fails for a blank group name or an unsupported legislature.
pub fn deputies_by_group(params: &DeputiesByGroup) -> Result<String, QueryError> {
    let group = require(&params.gruppo, "gruppo")?;
    let legislature = params.legislatura.unwrap_or(CURRENT_LEGISLATURE);
    let mut body = member_names(&CAMERA, None, None)
        .pattern(in_legislature(&CAMERA, "?deputato", legislature)?)
        .pattern(group_membership(&CAMERA))
        .triples(
            "?gruppo dc:title ?nomeGruppo ;
  dcterms:alternative ?sigla .",
        )
        .filter(Filter::regex("?nomeGruppo", group))
        .optional(WhereClause::new().triples("?adesione ocd:startDate ?inizioAdesione ."))
        .optional(WhereClause::new().triples("?adesione ocd:endDate ?fineAdesione ."));
    if params.solo_in_carica {
        body = body.filter(Filter::unbound("?fineAdesione"));
    }

    Ok(CAMERA.select(
        "?deputato ?cognome ?nome ?nomeGruppo ?sigla ?inizioAdesione ?fineAdesione",
        &body,
        &QueryOptions::new().with_order_by("?cognome ?nome").with_limit(200),
    ))
}

/// Deputies who held government offices in a legislature.
///
/// # Errors
/// Fails for legislatures outside the supported range.
pub fn government_roles(params: &GovernmentRoles) -> Result<String, QueryError> {
    let legislature = params.legislatura.unwrap_or(CURRENT_LEGISLATURE);
    let scope = MemberScope {
        cognome: params.cognome.as_deref(),
        nome: params.nome.as_deref(),
        legislatura: Some(legislature),
        active_only: false,
    };
    let body = members(&CAMERA, &scope)?
        .triples(
            "?persona ocd:rif_mandatoCamera ?mandato ;
  a foaf:Person ;
  ocd:rif_membroGoverno ?membroGoverno .",
        )
        .pattern(in_legislature(&CAMERA, "?membroGoverno", legislature)?)
        .triples(
            "?membroGoverno ocd:startDate ?dataInizio ;
  ocd:membroGoverno ?carica ;
  ocd:rif_governo ?governo .
?governo dc:title ?nomeGoverno .",
        )
        .optional(WhereClause::new().triples(
            "?membroGoverno ocd:rif_organoGoverno ?organoGoverno .
?organoGoverno dc:title ?nomeOrganoGoverno .",
        ))
        .optional(WhereClause::new().triples("?membroGoverno ocd:endDate ?dataFine ."))
        .optional(WhereClause::new().triples("?membroGoverno dc:description ?delega ."));

    Ok(CAMERA.select(
        "?deputato ?cognome ?nome ?membroGoverno ?dataInizio ?dataFine ?carica ?nomeGoverno ?nomeOrganoGoverno ?delega",
        &body,
        &QueryOptions::new()
            .with_order_by("?nomeGoverno")
            .with_limit(QUERY_LIMITS.max),
    ))
}
