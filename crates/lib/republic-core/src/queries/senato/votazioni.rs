//! Senate roll-call votes and the individual votes cast in them.

use republic_sparql::{Filter, Op, Pattern, QueryError, QueryOptions, Term, WhereClause};
use serde::Deserialize;

use crate::institution::{CURRENT_LEGISLATURE, QUERY_LIMITS, SENATO, clamp_limit};
use crate::queries::common::{given, member_names, require};

/// Vote property and the label bound to `?voto` for it.
const VOTE_KINDS: [(&str, &str); 3] = [
    ("osr:favorevole", "Favorevole"),
    ("osr:contrario", "Contrario"),
    ("osr:astenuto", "Astenuto"),
];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecentVotings {
    pub legislatura: Option<u32>,
    pub data_da: Option<String>,
    pub data_a: Option<String>,
    pub esito: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// A vote identified by its number within a sitting date.
#[derive(Debug, Clone, Deserialize)]
pub struct VotingKey {
    pub numero: String,
    pub data: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SenatorVotes {
    pub cognome: String,
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub data_da: Option<String>,
    #[serde(default)]
    pub data_a: Option<String>,
    #[serde(default)]
    pub legislatura: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VotingsByOutcome {
    pub esito: String,
    #[serde(default)]
    pub legislatura: Option<u32>,
    #[serde(default)]
    pub data_da: Option<String>,
    #[serde(default)]
    pub data_a: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VotingStatistics {
    pub legislatura: Option<u32>,
    pub data_da: Option<String>,
    pub data_a: Option<String>,
}

/// `?seduta osr:dataSeduta ?data ; osr:legislatura <n> .`
fn sitting(legislature: Option<u32>) -> Result<Pattern, QueryError> {
    let number = legislature.unwrap_or(CURRENT_LEGISLATURE);
    Ok(Pattern::new("?seduta osr:dataSeduta ?data ;\n  osr:legislatura $legislature .")
        .bind("legislature", SENATO.legislature(number)?))
}

fn page(limit: Option<u32>, offset: Option<u32>) -> QueryOptions {
    let options = QueryOptions::new()
        .with_order_by("?data")
        .descending()
        .with_limit(clamp_limit(limit, QUERY_LIMITS.votings));
    match offset {
        Some(offset) => options.with_offset(offset),
        None => options,
    }
}

/// One branch per vote kind, binding the kind label to `?voto`.
fn cast_votes() -> WhereClause {
    WhereClause::new().union(
        VOTE_KINDS
            .iter()
            .map(|&(property, label)| {
                WhereClause::new()
                    .pattern(
                        Pattern::new("?votazione $property ?senatore .")
                            .bind("property", Term::Name(property)),
                    )
                    .bind(Term::literal(label), "?voto")
            })
            .collect(),
    )
}

/// Most recent votes of a legislature with their counts.
///
/// # Errors
/// Fails for malformed dates or an unsupported legislature.
pub fn recent_votings(params: &RecentVotings) -> Result<String, QueryError> {
    let body = WhereClause::new()
        .triples(
            "?votazione a osr:Votazione ;
  osr:numero ?numero ;
  osr:seduta ?seduta ;
  rdfs:label ?oggetto ;
  osr:esito ?esito ;
  osr:presenti ?presenti ;
  osr:votanti ?votanti ;
  osr:favorevoli ?favorevoli ;
  osr:contrari ?contrari ;
  osr:astenuti ?astenuti .",
        )
        .pattern(sitting(params.legislatura)?)
        .filters(SENATO.date_range(
            "?data",
            given(params.data_da.as_deref()),
            given(params.data_a.as_deref()),
        )?)
        .filters(given(params.esito.as_deref()).map(|value| Filter::regex("?esito", value)));

    Ok(SENATO.select(
        "?votazione ?numero ?data ?oggetto ?esito ?presenti ?votanti ?favorevoli ?contrari ?astenuti",
        &body,
        &page(params.limit, params.offset),
    ))
}

/// Counts, majority, quorum and presiding officer of one vote.
///
/// # Errors
/// Fails for a blank number or a malformed date.
pub fn voting_details(params: &VotingKey) -> Result<String, QueryError> {
    let number = require(&params.numero, "numero")?;
    let body = WhereClause::new()
        .pattern(
            Pattern::new(
                "?votazione a osr:Votazione ;
  osr:numero $number ;
  osr:seduta ?seduta ;
  rdfs:label ?oggetto ;
  osr:esito ?esito ;
  osr:presenti ?presenti ;
  osr:votanti ?votanti ;
  osr:favorevoli ?favorevoli ;
  osr:contrari ?contrari ;
  osr:astenuti ?astenuti ;
  osr:maggioranza ?maggioranza ;
  osr:numeroLegale ?numeroLegale .",
            )
            .bind("number", Term::literal(number)),
        )
        .triples(
            "?seduta osr:dataSeduta ?data ;
  osr:numeroSeduta ?numeroSeduta ;
  osr:legislatura ?legislatura .",
        )
        .filter(SENATO.date_filter("?data", Op::Eq, "data", &params.data)?)
        .optional(WhereClause::new().triples("?votazione osr:tipoVotazione ?tipoVotazione ."))
        .optional(WhereClause::new().triples("?votazione osr:presidente ?presidente ."));

    Ok(SENATO.select(
        "?votazione ?numero ?data ?oggetto ?esito ?tipoVotazione ?presenti ?votanti ?favorevoli ?contrari ?astenuti ?maggioranza ?numeroLegale ?presidente ?numeroSeduta ?legislatura",
        &body,
        &QueryOptions::new(),
    ))
}

/// How a senator voted, vote by vote.
///
/// # Errors
/// Fails for a blank surname, malformed dates or an unsupported legislature.
pub fn senator_votes(params: &SenatorVotes) -> Result<String, QueryError> {
    let surname = require(&params.cognome, "cognome")?;
    let body = member_names(&SENATO, Some(surname), params.nome.as_deref())
        .triples(
            "?votazione a osr:Votazione ;
  osr:seduta ?seduta ;
  osr:numero ?numero ;
  rdfs:label ?oggetto .",
        )
        .pattern(sitting(params.legislatura)?)
        .append(cast_votes())
        .filters(SENATO.date_range(
            "?data",
            given(params.data_da.as_deref()),
            given(params.data_a.as_deref()),
        )?);

    Ok(SENATO.select(
        "?votazione ?data ?numero ?oggetto ?voto",
        &body,
        &page(params.limit, None),
    ))
}

fn counted(
    var: &'static str,
    template: &'static str,
    date: &'static str,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<WhereClause, QueryError> {
    Ok(WhereClause::new()
        .pattern(Pattern::new(template).bind("vote", Term::var(var)).bind("date", Term::var(date)))
        .filters(SENATO.date_range(date, from, to)?))
}

/// Favourable, contrary and abstention counts for a senator.
///
/// # Errors
/// Fails for a blank surname, malformed dates or an unsupported legislature.
pub fn senator_vote_stats(params: &SenatorVotes) -> Result<String, QueryError> {
    let surname = require(&params.cognome, "cognome")?;
    let legislature = params.legislatura.unwrap_or(CURRENT_LEGISLATURE);
    let from = given(params.data_da.as_deref());
    let to = given(params.data_a.as_deref());
    let body = member_names(&SENATO, Some(surname), params.nome.as_deref())
        .pattern(
            Pattern::new("?senatore osr:mandato ?mandato .\n?mandato osr:legislatura $legislature .")
                .bind("legislature", SENATO.legislature(legislature)?),
        )
        .optional(counted(
            "?votFav",
            "$vote a osr:Votazione ;\n  osr:favorevole ?senatore ;\n  osr:seduta/osr:dataSeduta $date .",
            "?dataFav",
            from,
            to,
        )?)
        .optional(counted(
            "?votContr",
            "$vote a osr:Votazione ;\n  osr:contrario ?senatore ;\n  osr:seduta/osr:dataSeduta $date .",
            "?dataContr",
            from,
            to,
        )?)
        .optional(counted(
            "?votAst",
            "$vote a osr:Votazione ;\n  osr:astenuto ?senatore ;\n  osr:seduta/osr:dataSeduta $date .",
            "?dataAst",
            from,
            to,
        )?);

    Ok(SENATO.select(
        "?senatore ?cognome ?nome (COUNT(DISTINCT ?votFav) AS ?voti_favorevoli) (COUNT(DISTINCT ?votContr) AS ?voti_contrari) (COUNT(DISTINCT ?votAst) AS ?voti_astenuti)",
        &body,
        &QueryOptions::new().with_group_by("?senatore ?cognome ?nome"),
    ))
}

/// Votes whose outcome matches, newest first.
///
/// # Errors
/// Fails for a blank outcome, malformed dates or an unsupported legislature.
pub fn votings_by_outcome(params: &VotingsByOutcome) -> Result<String, QueryError> {
    let outcome = require(&params.esito, "esito")?;
    let body = WhereClause::new()
        .triples(
            "?votazione a osr:Votazione ;
  osr:numero ?numero ;
  osr:seduta ?seduta ;
  rdfs:label ?oggetto ;
  osr:esito ?esito ;
  osr:favorevoli ?favorevoli ;
  osr:contrari ?contrari ;
  osr:maggioranza ?maggioranza .",
        )
        .pattern(sitting(params.legislatura)?)
        .filter(Filter::regex("?esito", outcome))
        .filters(SENATO.date_range(
            "?data",
            given(params.data_da.as_deref()),
            given(params.data_a.as_deref()),
        )?);

    Ok(SENATO.select(
        "?votazione ?numero ?data ?oggetto ?favorevoli ?contrari ?maggioranza",
        &body,
        &page(params.limit, None),
    ))
}

/// Every senator's vote in one roll call.
///
/// # Errors
/// Fails for a blank number or a malformed date.
pub fn individual_votes(params: &VotingKey) -> Result<String, QueryError> {
    let number = require(&params.numero, "numero")?;
    let body = WhereClause::new()
        .pattern(
            Pattern::new(
                "?votazione a osr:Votazione ;
  osr:numero $number ;
  osr:seduta ?seduta .
?seduta osr:dataSeduta ?dataVotazione .",
            )
            .bind("number", Term::literal(number)),
        )
        .filter(SENATO.date_filter("?dataVotazione", Op::Eq, "data", &params.data)?)
        .append(cast_votes())
        .triples(
            "?senatore foaf:lastName ?cognome ;
  foaf:firstName ?nome .",
        );

    Ok(SENATO.select(
        "?senatore ?cognome ?nome ?voto",
        &body,
        &QueryOptions::new().with_order_by("?cognome"),
    ))
}

/// Vote counts and average participation per outcome.
///
/// # Errors
/// Fails for malformed dates or an unsupported legislature.
pub fn voting_statistics(params: &VotingStatistics) -> Result<String, QueryError> {
    let body = WhereClause::new()
        .triples(
            "?votazione a osr:Votazione ;
  osr:esito ?esito ;
  osr:seduta ?seduta ;
  osr:presenti ?presenti ;
  osr:votanti ?votanti .",
        )
        .pattern(sitting(params.legislatura)?)
        .triples("BIND((?votanti * 100.0 / ?presenti) AS ?partecipazione)")
        .filters(SENATO.date_range(
            "?data",
            given(params.data_da.as_deref()),
            given(params.data_a.as_deref()),
        )?);

    Ok(SENATO.select(
        "?esito (COUNT(?votazione) AS ?count) (AVG(?partecipazione) AS ?avg_partecipazione)",
        &body,
        &QueryOptions::new()
            .with_distinct(false)
            .with_group_by("?esito")
            .with_order_by("?count")
            .descending(),
    ))
}
