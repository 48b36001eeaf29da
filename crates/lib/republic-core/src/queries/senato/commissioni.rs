//! Standing commissions and senators' memberships (`osr:afferisce`).

use republic_sparql::{Filter, Pattern, QueryError, QueryOptions, Term, WhereClause};
use serde::Deserialize;

use crate::institution::{QUERY_LIMITS, SENATO, clamp_limit};
use crate::queries::common::{given, member_names, require};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommissionSearch {
    pub ordinale: Option<String>,
    pub limit: Option<u32>,
}

/// Identifies a commission by ordinal (`"1"` for the 1st) or by URI.
#[derive(Debug, Clone, Deserialize)]
pub struct CommissionMembers {
    #[serde(default)]
    pub ordinale: Option<String>,
    #[serde(default)]
    pub commissione_uri: Option<String>,
    #[serde(default = "default_true")]
    pub solo_in_carica: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SenatorMemberships {
    pub cognome: String,
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default = "default_true")]
    pub solo_in_carica: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommissionTitle {
    pub termine: String,
}

const fn default_true() -> bool {
    true
}

/// Commissions whose current denomination has no end date.
fn open_commissions() -> WhereClause {
    WhereClause::new()
        .triples(
            "?commissione a osr:Commissione ;
  osr:denominazione ?den .
?den osr:titolo ?titolo .",
        )
        .active("?den", "osr:fine")
        .optional(WhereClause::new().triples("?commissione osr:categoriaCommissione ?categoria ."))
        .optional(WhereClause::new().triples("?commissione osr:ordinale ?ordinale ."))
}

fn commission(ordinale: Option<&str>, uri: Option<&str>) -> Result<WhereClause, QueryError> {
    let ordinale = given(ordinale);
    let uri = given(uri);
    if ordinale.is_none() && uri.is_none() {
        return Err(QueryError::MissingParameter("ordinale"));
    }
    let mut body = WhereClause::new().triples(
        "?commissione a osr:Commissione ;
  osr:denominazione/osr:titolo ?nomeCommissione .",
    );
    if let Some(ordinale) = ordinale {
        body = body.pattern(
            Pattern::new("?commissione osr:ordinale $ordinale .")
                .bind("ordinale", Term::literal(ordinale)),
        );
    }
    if let Some(uri) = uri {
        body = body.filter(Filter::equals("?commissione", Term::iri(uri)?));
    }
    Ok(body)
}

fn memberships(active_only: bool) -> WhereClause {
    let body = WhereClause::new()
        .triples(
            "?senatore osr:afferisce ?afferenza .
?afferenza osr:commissione ?commissione ;
  osr:inizio ?inizio .",
        )
        .optional(WhereClause::new().triples("?afferenza osr:carica ?carica ."))
        .optional(WhereClause::new().triples("?afferenza osr:fine ?fine ."));
    if active_only {
        body.filter(Filter::unbound("?fine"))
    } else {
        body
    }
}

/// Commissions currently sitting, by ordinal.
#[must_use]
pub fn active_commissions(params: &CommissionSearch) -> String {
    let body = open_commissions().filters(
        given(params.ordinale.as_deref())
            .map(|value| Filter::equals("?ordinale", Term::literal(value))),
    );

    SENATO.select(
        "?commissione ?titolo ?categoria ?ordinale",
        &body,
        &QueryOptions::new()
            .with_order_by("?ordinale")
            .with_limit(clamp_limit(params.limit, QUERY_LIMITS.default)),
    )
}

/// Members of a commission, optionally including past ones.
///
/// # Errors
/// Fails when neither `ordinale` nor `commissione_uri` is given, or the URI is unsafe.
pub fn commission_composition(params: &CommissionMembers) -> Result<String, QueryError> {
    let body = commission(params.ordinale.as_deref(), params.commissione_uri.as_deref())?
        .append(memberships(params.solo_in_carica))
        .triples("?senatore foaf:firstName ?nome ;\n  foaf:lastName ?cognome .");

    Ok(SENATO.select(
        "?commissione ?nomeCommissione ?senatore ?cognome ?nome ?carica ?inizio ?fine",
        &body,
        &QueryOptions::new().with_order_by("?cognome"),
    ))
}

/// Presidents, vice presidents and secretaries of a commission.
///
/// # Errors
/// Fails when neither `ordinale` nor `commissione_uri` is given, or the URI is unsafe.
pub fn commission_leadership(params: &CommissionMembers) -> Result<String, QueryError> {
    let body = commission(params.ordinale.as_deref(), params.commissione_uri.as_deref())?
        .triples(
            "?senatore osr:afferisce ?afferenza .
?afferenza osr:commissione ?commissione ;
  osr:inizio ?inizio ;
  osr:carica ?carica .",
        )
        .filter(Filter::bound("?carica"))
        .active("?afferenza", "osr:fine")
        .triples("?senatore foaf:firstName ?nome ;\n  foaf:lastName ?cognome .");

    Ok(SENATO.select(
        "?commissione ?nomeCommissione ?senatore ?cognome ?nome ?carica ?inizio",
        &body,
        &QueryOptions::new().with_order_by("?carica"),
    ))
}

/// Commissions a senator sits or sat on, latest first.
///
/// # Errors
/// Fails for a blank surname.
pub fn senator_commissions(params: &SenatorMemberships) -> Result<String, QueryError> {
    let surname = require(&params.cognome, "cognome")?;
    let body = member_names(&SENATO, Some(surname), params.nome.as_deref())
        .append(memberships(params.solo_in_carica))
        .triples("?commissione osr:denominazione ?den .\n?den osr:titolo ?nomeCommissione .");

    Ok(SENATO.select(
        "?senatore ?cognome ?nome ?commissione ?nomeCommissione ?carica ?inizio ?fine",
        &body,
        &QueryOptions::new().with_order_by("?inizio").descending(),
    ))
}

/// Sitting commissions whose title matches a search term.
///
/// # Errors
/// Fails for a blank term.
pub fn search_commissions(params: &CommissionTitle) -> Result<String, QueryError> {
    let term = require(&params.termine, "termine")?;
    let body = open_commissions().filter(Filter::regex("?titolo", term));

    Ok(SENATO.select(
        "?commissione ?titolo ?categoria ?ordinale",
        &body,
        &QueryOptions::new()
            .with_order_by("?ordinale")
            .with_limit(QUERY_LIMITS.default),
    ))
}

/// Current head count of every sitting commission.
#[must_use]
pub fn commission_statistics() -> String {
    let body = WhereClause::new()
        .triples(
            "?commissione a osr:Commissione ;
  osr:denominazione ?den .
?den osr:titolo ?nomeCommissione .",
        )
        .active("?den", "osr:fine")
        .optional(WhereClause::new().triples("?commissione osr:ordinale ?ordinale ."))
        .optional(
            WhereClause::new()
                .triples("?senatore osr:afferisce ?afferenza .\n?afferenza osr:commissione ?commissione .")
                .active("?afferenza", "osr:fine"),
        );

    SENATO.select(
        "?commissione ?nomeCommissione ?ordinale (COUNT(DISTINCT ?senatore) AS ?num_membri)",
        &body,
        &QueryOptions::new()
            .with_distinct(false)
            .with_group_by("?commissione ?nomeCommissione ?ordinale")
            .with_order_by("?ordinale"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members_of(ordinale: Option<&str>, uri: Option<&str>) -> CommissionMembers {
        CommissionMembers {
            ordinale: ordinale.map(str::to_string),
            commissione_uri: uri.map(str::to_string),
            solo_in_carica: true,
        }
    }

    #[test]
    fn active_commissions_skip_closed_denominations() {
        let query = active_commissions(&CommissionSearch {
            ordinale: Some("5".to_string()),
            limit: None,
        });
        assert!(query.contains("OPTIONAL { ?den osr:fine ?den_end . }"));
        assert!(query.contains("FILTER(!bound(?den_end))"));
        assert!(query.contains("FILTER(?ordinale = \"5\")"));
        assert!(query.ends_with("ORDER BY ASC(?ordinale)\nLIMIT 100"));
    }

    #[test]
    fn composition_needs_an_ordinal_or_uri() {
        assert_eq!(
            commission_composition(&members_of(None, Some("  "))),
            Err(QueryError::MissingParameter("ordinale"))
        );
        let query = commission_composition(&members_of(Some("1"), None)).expect("query should build");
        assert!(query.contains("?commissione osr:ordinale \"1\" ."));
        assert!(query.contains("FILTER(!bound(?fine))"));
    }

    #[test]
    fn composition_by_uri_compares_the_subject() {
        let query = commission_composition(&members_of(
            None,
            Some("http://dati.senato.it/commissione/14"),
        ))
        .expect("query should build");
        assert!(query.contains("FILTER(?commissione = <http://dati.senato.it/commissione/14>)"));
        assert!(!query.contains("osr:ordinale"));
    }

    #[test]
    fn leadership_requires_an_office() {
        let query = commission_leadership(&members_of(Some("2"), None)).expect("query should build");
        assert!(query.contains("FILTER(bound(?carica))"));
        assert!(query.contains("FILTER(!bound(?afferenza_end))"));
    }

    #[test]
    fn senator_history_can_include_past_memberships() {
        let query = senator_commissions(&SenatorMemberships {
            cognome: "Casini".to_string(),
            nome: None,
            solo_in_carica: false,
        })
        .expect("query should build");
        assert!(query.contains("FILTER(REGEX(?cognome, \"Casini\", \"i\"))"));
        assert!(!query.contains("!bound(?fine)"));
        assert!(query.ends_with("ORDER BY DESC(?inizio)"));
    }

    #[test]
    fn statistics_group_before_ordering() {
        let query = commission_statistics();
        assert!(query.contains("SELECT ?commissione ?nomeCommissione ?ordinale (COUNT(DISTINCT ?senatore) AS ?num_membri)"));
        assert!(query.ends_with("GROUP BY ?commissione ?nomeCommissione ?ordinale\nORDER BY ASC(?ordinale)"));
    }
}
