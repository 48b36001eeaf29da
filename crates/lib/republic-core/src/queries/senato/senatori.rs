//! Senators, their mandates and where they were elected.

use republic_sparql::{Filter, Pattern, QueryError, QueryOptions, Term, WhereClause};
use serde::Deserialize;

use crate::institution::{CURRENT_LEGISLATURE, QUERY_LIMITS, SENATO, clamp_limit};
use crate::queries::common::{MemberScope, given, member_names, members, require};

/// Mandate types that make a senator one for life.
pub const LIFE_MANDATES: [&str; 2] = [
    "a vita, di nomina del Presidente della Repubblica",
    "di diritto e a vita, Presidente emerito della Repubblica",
];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CurrentSenators {
    pub cognome: Option<String>,
    pub nome: Option<String>,
    pub legislatura: Option<u32>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SenatorSearch {
    pub cognome: String,
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub legislatura: Option<u32>,
    #[serde(default = "default_true")]
    pub solo_in_carica: bool,
    #[serde(default)]
    pub tipo_mandato: Option<String>,
    #[serde(default)]
    pub regione: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Surname plus optional first name.
#[derive(Debug, Clone, Deserialize)]
pub struct SenatorName {
    pub cognome: String,
    #[serde(default)]
    pub nome: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LifeSenators {
    pub legislatura: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SenatorsByLegislature {
    pub legislatura: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SenatorsByRegion {
    pub regione: String,
    #[serde(default)]
    pub legislatura: Option<u32>,
}

const fn default_true() -> bool {
    true
}

fn legislature_filter(number: Option<u32>) -> Result<Option<Filter>, QueryError> {
    number
        .map(|number| Ok(Filter::equals("?legislatura", SENATO.legislature(number)?)))
        .transpose()
}

/// Senators whose mandate in the legislature has not ended.
///
/// # Errors
/// Fails for legislatures outside the supported range.
pub fn current_senators(params: &CurrentSenators) -> Result<String, QueryError> {
    let scope = MemberScope {
        cognome: params.cognome.as_deref(),
        nome: params.nome.as_deref(),
        legislatura: None,
        active_only: true,
    };
    let body = members(&SENATO, &scope)?
        .triples(
            "?mandato osr:legislatura ?legislatura ;
  osr:inizio ?inizioMandato ;
  osr:tipoMandato ?tipoMandato .",
        )
        .filters(legislature_filter(Some(
            params.legislatura.unwrap_or(CURRENT_LEGISLATURE),
        ))?);

    let mut options = QueryOptions::new()
        .with_order_by("?cognome")
        .with_limit(clamp_limit(params.limit, QUERY_LIMITS.members));
    if let Some(offset) = params.offset {
        options = options.with_offset(offset);
    }
    Ok(SENATO.select(
        "?senatore ?cognome ?nome ?legislatura ?inizioMandato ?tipoMandato",
        &body,
        &options,
    ))
}

/// Senators by name with optional mandate type, region and legislature.
///
/// # Errors
/// Fails for a blank surname or an unsupported legislature.
pub fn search_senators(params: &SenatorSearch) -> Result<String, QueryError> {
    let scope = MemberScope {
        cognome: Some(require(&params.cognome, "cognome")?),
        nome: params.nome.as_deref(),
        legislatura: None,
        active_only: false,
    };
    let region = given(params.regione.as_deref());
    let mut body = members(&SENATO, &scope)?
        .triples(
            "?mandato osr:legislatura ?legislatura ;
  osr:inizio ?inizioMandato ;
  osr:tipoMandato ?tipoMandato .",
        )
        .optional(WhereClause::new().triples("?mandato osr:fine ?fineMandato ."))
        .optional(WhereClause::new().triples("?senatore foaf:depiction ?foto ."))
        .optional(WhereClause::new().triples("?senatore osr:dataNascita ?dataNascita ."));
    if region.is_some() {
        body = body.optional(WhereClause::new().triples("?mandato osr:regioneElezione ?regione ."));
    }
    if params.solo_in_carica {
        body = body.filter(Filter::unbound("?fineMandato"));
    }
    let body = body
        .filters(legislature_filter(params.legislatura)?)
        .filters(
            given(params.tipo_mandato.as_deref())
                .map(|value| Filter::equals("?tipoMandato", Term::literal(value))),
        )
        .filters(region.map(|value| Filter::regex("?regione", value)));

    Ok(SENATO.select(
        "?senatore ?cognome ?nome ?foto ?dataNascita ?legislatura ?inizioMandato ?fineMandato ?tipoMandato",
        &body,
        &QueryOptions::new()
            .with_order_by("?cognome")
            .with_limit(clamp_limit(params.limit, QUERY_LIMITS.default)),
    ))
}

/// Personal record: picture, gender, birth and residence.
///
/// # Errors
/// Fails for a blank surname.
pub fn senator_details(params: &SenatorName) -> Result<String, QueryError> {
    let surname = require(&params.cognome, "cognome")?;
    let mut body = member_names(&SENATO, Some(surname), params.nome.as_deref());
    for property in [
        "?senatore foaf:depiction ?foto .",
        "?senatore foaf:gender ?genere .",
        "?senatore osr:dataNascita ?dataNascita .",
        "?senatore osr:cittaNascita ?cittaNascita .",
        "?senatore osr:provinciaNascita ?provinciaNascita .",
        "?senatore osr:nazioneNascita ?nazioneNascita .",
        "?senatore osr:cittaResidenza ?cittaResidenza .",
        "?senatore osr:provinciaResidenza ?provinciaResidenza .",
        "?senatore osr:nazioneResidenza ?nazioneResidenza .",
    ] {
        body = body.optional(WhereClause::new().triples(property));
    }

    Ok(SENATO.select(
        "?senatore ?cognome ?nome ?foto ?genere ?dataNascita ?cittaNascita ?provinciaNascita ?nazioneNascita ?cittaResidenza ?provinciaResidenza ?nazioneResidenza",
        &body,
        &QueryOptions::new().with_limit(10),
    ))
}

/// Every mandate of a senator across legislatures, newest first.
///
/// # Errors
/// Fails for a blank surname.
pub fn senator_mandates(params: &SenatorName) -> Result<String, QueryError> {
    let scope = MemberScope {
        cognome: Some(require(&params.cognome, "cognome")?),
        nome: params.nome.as_deref(),
        ..MemberScope::default()
    };
    let body = members(&SENATO, &scope)?
        .triples(
            "?mandato osr:legislatura ?legislatura ;
  osr:inizio ?inizioMandato ;
  osr:tipoMandato ?tipoMandato .",
        )
        .optional(WhereClause::new().triples("?mandato osr:fine ?fineMandato ."))
        .optional(WhereClause::new().triples("?mandato osr:dataNomina ?dataNomina ."))
        .optional(WhereClause::new().triples("?mandato osr:regioneElezione ?regioneElezione ."));

    Ok(SENATO.select(
        "?senatore ?cognome ?nome ?mandato ?legislatura ?inizioMandato ?fineMandato ?tipoMandato ?dataNomina ?regioneElezione",
        &body,
        &QueryOptions::new().with_order_by("?legislatura").descending(),
    ))
}

/// Sitting life senators, by appointment date.
///
/// # Errors
/// Fails for legislatures outside the supported range.
pub fn life_senators(params: &LifeSenators) -> Result<String, QueryError> {
    let body = members(&SENATO, &MemberScope { active_only: true, ..MemberScope::default() })?
        .triples(
            "?mandato osr:tipoMandato ?tipoMandato ;
  osr:legislatura ?legislatura .",
        )
        .filter(Filter::any(
            LIFE_MANDATES
                .iter()
                .map(|kind| Filter::equals("?tipoMandato", Term::literal(*kind)))
                .collect(),
        ))
        .optional(WhereClause::new().triples("?mandato osr:dataNomina ?dataNomina ."))
        .filters(legislature_filter(params.legislatura)?);

    Ok(SENATO.select(
        "?senatore ?cognome ?nome ?tipoMandato ?dataNomina",
        &body,
        &QueryOptions::new().with_order_by("?dataNomina"),
    ))
}

/// All senators who held a mandate in the legislature.
///
/// # Errors
/// Fails for legislatures outside the supported range.
pub fn senators_by_legislature(params: &SenatorsByLegislature) -> Result<String, QueryError> {
    let body = members(&SENATO, &MemberScope::default())?
        .pattern(
            Pattern::new(
                "?mandato osr:legislatura $legislature ;
  osr:inizio ?inizioMandato ;
  osr:tipoMandato ?tipoMandato .",
            )
            .bind("legislature", SENATO.legislature(params.legislatura)?),
        )
        .optional(WhereClause::new().triples("?mandato osr:fine ?fineMandato ."));

    Ok(SENATO.select(
        "?senatore ?cognome ?nome ?inizioMandato ?fineMandato ?tipoMandato",
        &body,
        &QueryOptions::new()
            .with_order_by("?cognome")
            .with_limit(QUERY_LIMITS.members),
    ))
}

/// Sitting senators elected in a region.
///
/// # Errors
/// Fails for a blank region or an unsupported legislature.
pub fn senators_by_region(params: &SenatorsByRegion) -> Result<String, QueryError> {
    let region = require(&params.regione, "regione")?;
    let body = members(&SENATO, &MemberScope::default())?
        .triples(
            "?mandato osr:legislatura ?legislatura ;
  osr:inizio ?inizioMandato ;
  osr:regioneElezione ?regione .",
        )
        .filter(Filter::regex("?regione", region))
        .filters(legislature_filter(params.legislatura)?)
        .active("?mandato", "osr:fine");

    Ok(SENATO.select(
        "?senatore ?cognome ?nome ?regione ?inizioMandato",
        &body,
        &QueryOptions::new().with_order_by("?cognome"),
    ))
}
