//! Bills (disegni di legge) presented to or transmitted to the Senate.

use republic_sparql::{Filter, Pattern, QueryError, QueryOptions, Term, WhereClause};
use serde::Deserialize;

use crate::institution::{CURRENT_LEGISLATURE_START, QUERY_LIMITS, SENATO, clamp_limit};
use crate::queries::common::{given, member_names, require};

const DEFAULT_BRANCH: &str = "Senato";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecentBills {
    pub stato: Option<String>,
    pub ramo: Option<String>,
    pub data_da: Option<String>,
    pub data_a: Option<String>,
    pub legislatura: Option<u32>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BillsBySenator {
    pub cognome: String,
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub solo_primo_firmatario: bool,
    #[serde(default)]
    pub data_da: Option<String>,
    #[serde(default)]
    pub data_a: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BillsByState {
    pub stato: String,
    #[serde(default)]
    pub ramo: Option<String>,
    #[serde(default)]
    pub data_da: Option<String>,
    #[serde(default)]
    pub data_a: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BillId {
    pub id_ddl: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BillTitleSearch {
    pub parola_chiave: String,
    #[serde(default)]
    pub ramo: Option<String>,
    #[serde(default)]
    pub data_da: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BillStatistics {
    pub legislatura: Option<u32>,
}

fn branch(ramo: Option<&str>) -> Filter {
    Filter::equals("?ramo", Term::literal(given(ramo).unwrap_or(DEFAULT_BRANCH)))
}

fn presented_since(from: Option<&str>, to: Option<&str>) -> Result<Vec<Filter>, QueryError> {
    SENATO.date_range(
        "?dataPres",
        Some(given(from).unwrap_or(CURRENT_LEGISLATURE_START)),
        given(to),
    )
}

fn page(limit: Option<u32>, offset: Option<u32>, order_by: &'static str) -> QueryOptions {
    let options = QueryOptions::new()
        .with_order_by(order_by)
        .descending()
        .with_limit(clamp_limit(limit, QUERY_LIMITS.acts));
    match offset {
        Some(offset) => options.with_offset(offset),
        None => options,
    }
}

/// `?ddl` with the given id.
fn bill(id: BillId, template: &'static str) -> Pattern {
    Pattern::new(template).bind("id", Term::Integer(i64::from(id.id_ddl)))
}

/// Bills presented since the start of the legislature unless told otherwise.
///
/// # Errors
/// Fails for malformed dates or an unsupported legislature.
pub fn recent_bills(params: &RecentBills) -> Result<String, QueryError> {
    let mut body = WhereClause::new()
        .triples(
            "?ddl a osr:Ddl ;
  osr:idDdl ?idDdl ;
  osr:titolo ?titolo ;
  osr:dataPresentazione ?dataPres ;
  osr:statoDdl ?stato ;
  osr:dataStatoDdl ?dataStato ;
  osr:ramo ?ramo ;
  osr:legislatura ?legislatura .",
        )
        .optional(WhereClause::new().triples("?ddl osr:titoloBreve ?titoloBreve ."))
        .filter(branch(params.ramo.as_deref()))
        .filters(given(params.stato.as_deref()).map(|value| Filter::regex("?stato", value)))
        .filters(presented_since(params.data_da.as_deref(), params.data_a.as_deref())?);
    if let Some(number) = params.legislatura {
        body = body.filter(Filter::equals("?legislatura", SENATO.legislature(number)?));
    }

    Ok(SENATO.select(
        "?ddl ?idDdl ?titolo ?titoloBreve ?dataPres ?stato ?dataStato ?ramo ?legislatura",
        &body,
        &page(params.limit, params.offset, "?dataPres"),
    ))
}

/// Bills a senator presented or signed.
///
/// # Errors
/// Fails for a blank surname or malformed dates.
pub fn bills_by_senator(params: &BillsBySenator) -> Result<String, QueryError> {
    let surname = require(&params.cognome, "cognome")?;
    let mut body = member_names(&SENATO, Some(surname), params.nome.as_deref())
        .triples("?iniziativa osr:presentatore ?senatore .");
    if params.solo_primo_firmatario {
        body = body.pattern(
            Pattern::new("?iniziativa osr:primoFirmatario $first .").bind("first", Term::Boolean(true)),
        );
    }
    let body = body
        .optional(WhereClause::new().triples("?iniziativa osr:primoFirmatario ?primoFirmatario ."))
        .triples(
            "?ddl a osr:Ddl ;
  osr:iniziativa ?iniziativa ;
  osr:titolo ?titolo ;
  osr:dataPresentazione ?dataPres ;
  osr:statoDdl ?stato .",
        )
        .optional(WhereClause::new().triples("?ddl osr:titoloBreve ?titoloBreve ."))
        .filters(SENATO.date_range(
            "?dataPres",
            given(params.data_da.as_deref()),
            given(params.data_a.as_deref()),
        )?);

    Ok(SENATO.select(
        "?ddl ?titolo ?titoloBreve ?dataPres ?stato ?senatore ?cognome ?nome ?primoFirmatario",
        &body,
        &page(params.limit, None, "?dataPres"),
    ))
}

/// Bills whose current state matches, most recently changed first.
///
/// # Errors
/// Fails for a blank state or malformed dates.
pub fn bills_by_state(params: &BillsByState) -> Result<String, QueryError> {
    let state = require(&params.stato, "stato")?;
    let body = WhereClause::new()
        .triples(
            "?ddl a osr:Ddl ;
  osr:idDdl ?idDdl ;
  osr:titolo ?titolo ;
  osr:dataPresentazione ?dataPres ;
  osr:statoDdl ?stato ;
  osr:dataStatoDdl ?dataStato ;
  osr:ramo ?ramo .",
        )
        .filter(Filter::regex("?stato", state))
        .filter(branch(params.ramo.as_deref()))
        .filters(presented_since(params.data_da.as_deref(), params.data_a.as_deref())?);

    Ok(SENATO.select(
        "?ddl ?idDdl ?titolo ?dataPres ?dataStato ?ramo",
        &body,
        &page(params.limit, None, "?dataStato"),
    ))
}

/// Every phase of a bill's legislative iter, in order.
#[must_use]
pub fn bill_iter(params: BillId) -> String {
    let body = WhereClause::new()
        .pattern(bill(
            params,
            "?ddl a osr:Ddl ;
  osr:idDdl $id ;
  osr:titolo ?titolo ;
  osr:dataPresentazione ?dataPres ;
  osr:statoDdl ?stato ;
  osr:iter ?iter .
?iter osr:idDdl $id ;
  osr:fase ?faseIter .",
        ))
        .triples(
            "?faseIter osr:progrIter ?progrIter ;
  osr:ddl ?faseDdl .
?faseDdl osr:numeroFase ?numeroFase ;
  osr:statoDdl ?statoFase ;
  osr:dataStatoDdl ?dataStatoFase .",
        );

    SENATO.select(
        "?ddl ?titolo ?dataPres ?stato ?iter ?progrIter ?numeroFase ?statoFase ?dataStatoFase",
        &body,
        &QueryOptions::new().with_order_by("?progrIter"),
    )
}

/// Signatories of a bill with signature and withdrawal dates.
#[must_use]
pub fn bill_signatories(params: BillId) -> String {
    let body = WhereClause::new()
        .pattern(bill(
            params,
            "?ddl a osr:Ddl ;
  osr:idDdl $id ;
  osr:titolo ?titolo ;
  osr:iniziativa ?iniziativa .",
        ))
        .triples(
            "?iniziativa osr:presentatore ?senatore .
?senatore foaf:lastName ?cognome ;
  foaf:firstName ?nome .",
        )
        .optional(WhereClause::new().triples("?iniziativa osr:primoFirmatario ?primoFirmatario ."))
        .optional(WhereClause::new().triples("?iniziativa osr:dataAggiuntaFirma ?dataAggiunta ."))
        .optional(WhereClause::new().triples("?iniziativa osr:dataRitiroFirma ?dataRitiro ."));

    SENATO.select(
        "?ddl ?titolo ?senatore ?cognome ?nome ?primoFirmatario ?dataAggiunta ?dataRitiro",
        &body,
        &QueryOptions::new().with_order_by("?primoFirmatario").descending(),
    )
}

/// Full record of a bill: phase, nature, dates and text links.
#[must_use]
pub fn bill_details(params: BillId) -> String {
    let body = WhereClause::new()
        .pattern(bill(
            params,
            "?ddl a osr:Ddl ;
  osr:idDdl $id ;
  osr:idDdl ?idDdl ;
  osr:idFase ?idFase ;
  osr:ramo ?ramo ;
  osr:legislatura ?legislatura ;
  osr:numeroFase ?numeroFase ;
  osr:titolo ?titolo ;
  osr:presentatoTrasmesso ?presentatoTrasmesso ;
  osr:dataPresentazione ?dataPres ;
  osr:statoDdl ?stato ;
  osr:dataStatoDdl ?dataStato .",
        ))
        .optional(WhereClause::new().triples("?ddl osr:numeroFaseCompatto ?numeroFaseCompatto ."))
        .optional(WhereClause::new().triples("?ddl osr:titoloBreve ?titoloBreve ."))
        .optional(WhereClause::new().triples("?ddl osr:natura ?natura ."))
        .optional(WhereClause::new().triples("?ddl osr:testoPresentato ?testoPresentato ."))
        .optional(WhereClause::new().triples("?ddl osr:testoApprovato ?testoApprovato ."));

    SENATO.select(
        "?ddl ?idDdl ?idFase ?ramo ?legislatura ?numeroFase ?numeroFaseCompatto ?titolo ?titoloBreve ?natura ?presentatoTrasmesso ?dataPres ?stato ?dataStato ?testoPresentato ?testoApprovato",
        &body,
        &QueryOptions::new(),
    )
}

/// Keyword search over full and short titles.
///
/// # Errors
/// Fails for a blank keyword or a malformed date.
pub fn search_bills_by_title(params: &BillTitleSearch) -> Result<String, QueryError> {
    let keyword = require(&params.parola_chiave, "parola_chiave")?;
    let body = WhereClause::new()
        .triples(
            "?ddl a osr:Ddl ;
  osr:idDdl ?idDdl ;
  osr:titolo ?titolo ;
  osr:dataPresentazione ?dataPres ;
  osr:statoDdl ?stato ;
  osr:ramo ?ramo .",
        )
        .optional(WhereClause::new().triples("?ddl osr:titoloBreve ?titoloBreve ."))
        .filter(Filter::any(vec![
            Filter::regex("?titolo", keyword),
            Filter::regex("?titoloBreve", keyword),
        ]))
        .filter(branch(params.ramo.as_deref()))
        .filters(presented_since(params.data_da.as_deref(), None)?);

    Ok(SENATO.select(
        "?ddl ?idDdl ?titolo ?titoloBreve ?dataPres ?stato",
        &body,
        &page(params.limit, None, "?dataPres"),
    ))
}

/// Committees a bill was assigned to.
#[must_use]
pub fn bill_assignments(params: BillId) -> String {
    let body = WhereClause::new()
        .pattern(bill(
            params,
            "?ddl a osr:Ddl ;
  osr:idDdl $id ;
  osr:titolo ?titolo ;
  osr:assegnazione ?assegnazione .",
        ))
        .triples("?assegnazione osr:commissione ?commissione .")
        .optional(WhereClause::new().triples("?assegnazione osr:dataAssegnazione ?dataAssegnazione ."))
        .triples("?commissione osr:denominazione ?den .\n?den osr:titolo ?nomeCommissione .");

    SENATO.select(
        "?ddl ?titolo ?assegnazione ?commissione ?nomeCommissione ?dataAssegnazione",
        &body,
        &QueryOptions::new().with_order_by("?dataAssegnazione"),
    )
}

/// Number of Senate bills per state.
///
/// # Errors
/// Fails for legislatures outside the supported range.
pub fn bill_statistics(params: &BillStatistics) -> Result<String, QueryError> {
    let mut body = WhereClause::new().triples(
        "?ddl a osr:Ddl ;
  osr:statoDdl ?stato ;
  osr:ramo \"Senato\" .",
    );
    if let Some(number) = params.legislatura {
        body = body.pattern(
            Pattern::new("?ddl osr:legislatura $legislature .")
                .bind("legislature", SENATO.legislature(number)?),
        );
    }

    Ok(SENATO.select(
        "?stato (COUNT(?ddl) AS ?count)",
        &body,
        &QueryOptions::new()
            .with_distinct(false)
            .with_group_by("?stato")
            .with_order_by("?count")
            .descending(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recent_bills_default_to_senate_and_legislature_start() {
        let query = recent_bills(&RecentBills::default()).expect("query should build");
        assert!(query.contains("FILTER(?ramo = \"Senato\")"));
        assert!(query.contains("FILTER(xsd:date(STR(?dataPres)) >= xsd:date(\"2022-10-13\"))"));
        assert!(query.ends_with("ORDER BY DESC(?dataPres)\nLIMIT 100"));
    }

    #[test]
    fn first_signatory_only_requires_the_flag() {
        let query = bills_by_senator(&BillsBySenator {
            cognome: "Segre".to_string(),
            nome: None,
            solo_primo_firmatario: true,
            data_da: None,
            data_a: None,
            limit: Some(5),
        })
        .expect("query should build");
        assert!(query.contains("?iniziativa osr:primoFirmatario true ."));
        assert!(query.ends_with("LIMIT 5"));
    }

    #[test]
    fn bill_id_is_rendered_as_integer() {
        let query = bill_iter(BillId { id_ddl: 54321 });
        assert!(query.contains("osr:idDdl 54321 ;"));
        assert!(query.contains("?iter osr:idDdl 54321 ;"));
        assert!(query.ends_with("ORDER BY ASC(?progrIter)"));
    }

    #[test]
    fn title_search_checks_both_titles() {
        let query = search_bills_by_title(&BillTitleSearch {
            parola_chiave: "clima".to_string(),
            ramo: Some("Camera".to_string()),
            data_da: None,
            limit: None,
        })
        .expect("query should build");
        assert!(query.contains(
            "FILTER(REGEX(?titolo, \"clima\", \"i\") || REGEX(?titoloBreve, \"clima\", \"i\"))"
        ));
        assert!(query.contains("FILTER(?ramo = \"Camera\")"));
    }

    #[test]
    fn statistics_group_without_distinct() {
        let query = bill_statistics(&BillStatistics { legislatura: Some(19) }).expect("query should build");
        assert!(query.contains("SELECT ?stato (COUNT(?ddl) AS ?count)"));
        assert!(query.contains("?ddl osr:legislatura 19 ."));
        assert!(query.contains("GROUP BY ?stato\nORDER BY DESC(?count)"));
    }
}
