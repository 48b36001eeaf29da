//! Tools backed by the Senato della Repubblica endpoint, all `senato_`-prefixed.

use std::sync::Arc;

use republic_sparql::{QueryError, SparqlExecutor};
use serde::de::DeserializeOwned;

use crate::institution::Institution;
use crate::queries::senato::{commissioni, ddl, gruppi, senatori, votazioni};
use crate::tool::{InputSchema, ToolDefinition};
use crate::tools::{NoParams, raw_query_tool, select_tool};

const COGNOME: &str = "Cognome senatore (richiesto)";
const NOME: &str = "Nome senatore (opzionale)";
const LEGISLATURA: &str = "Numero legislatura (default: 19 - corrente)";
const DATA_DA: &str = "Data inizio periodo (formato: YYYY-MM-DD) - opzionale";
const DATA_A: &str = "Data fine periodo (formato: YYYY-MM-DD) - opzionale";
const RAMO: &str = "Ramo: \"Senato\" o \"Camera\" (default: \"Senato\")";
const ID_DDL: &str = "ID del disegno di legge (richiesto)";
const NUMERO_VOTAZIONE: &str = "Numero votazione (richiesto)";
const DATA_VOTAZIONE: &str = "Data votazione (formato: YYYY-MM-DD, richiesto)";

fn tool<P, B>(
    name: &'static str,
    description: &'static str,
    schema: InputSchema,
    executor: &Arc<dyn SparqlExecutor>,
    build: B,
) -> ToolDefinition
where
    P: DeserializeOwned + Send + 'static,
    B: Fn(&P) -> Result<String, QueryError> + Send + Sync + 'static,
{
    select_tool(name, description, Institution::Senato, schema, executor, build)
}

fn bill_schema() -> InputSchema {
    InputSchema::object().number("id_ddl", ID_DDL).require(&["id_ddl"])
}

fn voting_key_schema() -> InputSchema {
    InputSchema::object()
        .string("numero", NUMERO_VOTAZIONE)
        .string("data", DATA_VOTAZIONE)
        .require(&["numero", "data"])
}

fn senator_tools(executor: &Arc<dyn SparqlExecutor>) -> Vec<ToolDefinition> {
    vec![
        tool(
            "senato_get_senatori_correnti",
            "Ottieni l'elenco dei senatori attualmente in carica al Senato della Repubblica",
            InputSchema::object()
                .string("cognome", "Filtra per cognome (opzionale, case-insensitive)")
                .string("nome", "Filtra per nome (opzionale, case-insensitive)")
                .number("legislatura", LEGISLATURA)
                .number("limit", "Numero massimo risultati (default: 500)")
                .number("offset", "Numero di risultati da saltare (paginazione, opzionale)"),
            executor,
            senatori::current_senators,
        ),
        tool(
            "senato_cerca_senatori",
            "Cerca senatori al Senato con filtri avanzati (nome, cognome, legislatura, tipo mandato, regione)",
            InputSchema::object()
                .string("cognome", COGNOME)
                .string("nome", NOME)
                .number("legislatura", "Numero legislatura (opzionale)")
                .boolean("solo_in_carica", "Solo senatori attualmente in carica (default: true)")
                .string(
                    "tipo_mandato",
                    "Tipo mandato: \"ordinario\", \"a vita, di nomina del Presidente della Repubblica\", \"di diritto e a vita, Presidente emerito della Repubblica\"",
                )
                .string("regione", "Regione di elezione (opzionale)")
                .number("limit", "Numero massimo risultati (default: 100)")
                .require(&["cognome"]),
            executor,
            senatori::search_senators,
        ),
        tool(
            "senato_get_senatore_dettagli",
            "Ottieni informazioni complete su un senatore (anagrafica, foto, nascita, residenza)",
            InputSchema::object()
                .string("cognome", COGNOME)
                .string("nome", "Nome senatore (opzionale per disambiguare)")
                .require(&["cognome"]),
            executor,
            senatori::senator_details,
        ),
        tool(
            "senato_get_senatore_mandati",
            "Ottieni la storia dei mandati parlamentari di un senatore (tutte le legislature)",
            InputSchema::object()
                .string("cognome", COGNOME)
                .string("nome", NOME)
                .require(&["cognome"]),
            executor,
            senatori::senator_mandates,
        ),
        tool(
            "senato_get_senatori_a_vita",
            "Ottieni l'elenco dei senatori a vita (nominati dal Presidente o ex Presidenti della Repubblica)",
            InputSchema::object()
                .number("legislatura", "Numero legislatura (opzionale, default: corrente)"),
            executor,
            senatori::life_senators,
        ),
        tool(
            "senato_get_senatori_per_legislatura",
            "Ottieni tutti i senatori di una specifica legislatura",
            InputSchema::object()
                .number(
                    "legislatura",
                    "Numero legislatura (es: 19 per XIX legislatura, 18 per XVIII, ecc.)",
                )
                .require(&["legislatura"]),
            executor,
            senatori::senators_by_legislature,
        ),
        tool(
            "senato_get_senatori_per_regione",
            "Ottieni i senatori eletti in una specifica regione",
            InputSchema::object()
                .string("regione", "Nome regione (es: \"Lombardia\", \"Lazio\", \"Sicilia\")")
                .number("legislatura", "Numero legislatura (opzionale, default: corrente)")
                .require(&["regione"]),
            executor,
            senatori::senators_by_region,
        ),
    ]
}

fn bill_tools(executor: &Arc<dyn SparqlExecutor>) -> Vec<ToolDefinition> {
    vec![
        tool(
            "senato_get_ddl_recenti",
            "Ottieni i disegni di legge (DDL) recenti presentati al Senato",
            InputSchema::object()
                .string(
                    "stato",
                    "Filtra per stato (es: \"In corso\", \"Approvato\", \"Respinto\") - opzionale",
                )
                .string("ramo", RAMO)
                .string(
                    "data_da",
                    "Data inizio periodo (formato: YYYY-MM-DD, default: inizio legislatura corrente)",
                )
                .string("data_a", DATA_A)
                .number("legislatura", "Numero legislatura (opzionale)")
                .number("limit", "Numero massimo risultati (default: 100)")
                .number("offset", "Numero di risultati da saltare (paginazione, opzionale)"),
            executor,
            ddl::recent_bills,
        ),
        tool(
            "senato_get_ddl_senatore",
            "Ottieni i disegni di legge presentati o firmati da un senatore",
            InputSchema::object()
                .string("cognome", COGNOME)
                .string("nome", NOME)
                .boolean(
                    "solo_primo_firmatario",
                    "Solo DDL come primo firmatario (default: false - mostra tutti)",
                )
                .string("data_da", DATA_DA)
                .string("data_a", DATA_A)
                .number("limit", "Numero massimo risultati (default: 100)")
                .require(&["cognome"]),
            executor,
            ddl::bills_by_senator,
        ),
        tool(
            "senato_get_ddl_per_stato",
            "Ottieni i disegni di legge filtrati per stato (In corso, Approvato, Respinto, etc.)",
            InputSchema::object()
                .string(
                    "stato",
                    "Stato DDL (es: \"In corso\", \"Approvato\", \"Respinto\", \"Decaduto\")",
                )
                .string("ramo", RAMO)
                .string("data_da", DATA_DA)
                .string("data_a", DATA_A)
                .number("limit", "Numero massimo risultati (default: 100)")
                .require(&["stato"]),
            executor,
            ddl::bills_by_state,
        ),
        tool(
            "senato_get_ddl_iter",
            "Ottieni i dettagli completi di un DDL incluso l'iter legislativo (tutte le fasi)",
            bill_schema(),
            executor,
            |params: &ddl::BillId| Ok(ddl::bill_iter(*params)),
        ),
        tool(
            "senato_get_ddl_firmatari",
            "Ottieni tutti i firmatari (sponsor) di un disegno di legge specifico",
            bill_schema(),
            executor,
            |params: &ddl::BillId| Ok(ddl::bill_signatories(*params)),
        ),
        tool(
            "senato_get_ddl_dettagli",
            "Ottieni tutti i dettagli di un disegno di legge (titolo, natura, date, testi, stato)",
            bill_schema(),
            executor,
            |params: &ddl::BillId| Ok(ddl::bill_details(*params)),
        ),
        tool(
            "senato_cerca_ddl_per_titolo",
            "Cerca disegni di legge per parola chiave nel titolo",
            InputSchema::object()
                .string("parola_chiave", "Parola o frase da cercare nel titolo (richiesto)")
                .string("ramo", RAMO)
                .string("data_da", DATA_DA)
                .number("limit", "Numero massimo risultati (default: 100)")
                .require(&["parola_chiave"]),
            executor,
            ddl::search_bills_by_title,
        ),
        tool(
            "senato_get_ddl_assegnazioni",
            "Ottieni le assegnazioni di un disegno di legge alle commissioni (sede, data)",
            bill_schema(),
            executor,
            |params: &ddl::BillId| Ok(ddl::bill_assignments(*params)),
        ),
        tool(
            "senato_get_statistiche_ddl",
            "Ottieni il numero di disegni di legge per stato dell'iter",
            InputSchema::object().number("legislatura", "Numero legislatura (opzionale)"),
            executor,
            ddl::bill_statistics,
        ),
    ]
}

fn voting_tools(executor: &Arc<dyn SparqlExecutor>) -> Vec<ToolDefinition> {
    vec![
        tool(
            "senato_get_votazioni_recenti",
            "Ottieni le votazioni recenti al Senato con conteggi e esiti",
            InputSchema::object()
                .number("legislatura", LEGISLATURA)
                .string("data_da", DATA_DA)
                .string("data_a", DATA_A)
                .string(
                    "esito",
                    "Filtra per esito (es: \"approvato\", \"respinto\") - opzionale",
                )
                .number("limit", "Numero massimo risultati (default: 50)")
                .number("offset", "Numero di risultati da saltare (paginazione, opzionale)"),
            executor,
            votazioni::recent_votings,
        ),
        tool(
            "senato_get_votazione_dettagli",
            "Ottieni i dettagli completi di una votazione specifica (numero, data, conteggi, esito)",
            voting_key_schema(),
            executor,
            votazioni::voting_details,
        ),
        tool(
            "senato_get_voti_senatore",
            "Ottieni i voti espressi da un senatore (favorevole, contrario, astenuto)",
            InputSchema::object()
                .string("cognome", COGNOME)
                .string("nome", NOME)
                .string("data_da", DATA_DA)
                .string("data_a", DATA_A)
                .number("legislatura", LEGISLATURA)
                .number("limit", "Numero massimo risultati (default: 50)")
                .require(&["cognome"]),
            executor,
            votazioni::senator_votes,
        ),
        tool(
            "senato_get_statistiche_voto_senatore",
            "Ottieni le statistiche di voto di un senatore (numero voti favorevoli, contrari, astenuti)",
            InputSchema::object()
                .string("cognome", COGNOME)
                .string("nome", NOME)
                .number("legislatura", LEGISLATURA)
                .string("data_da", DATA_DA)
                .string("data_a", DATA_A)
                .require(&["cognome"]),
            executor,
            votazioni::senator_vote_stats,
        ),
        tool(
            "senato_get_votazioni_per_esito",
            "Ottieni le votazioni filtrate per esito (approvato, respinto, etc.)",
            InputSchema::object()
                .string("esito", "Esito votazione (es: \"approvato\", \"respinto\") - richiesto")
                .number("legislatura", LEGISLATURA)
                .string("data_da", DATA_DA)
                .string("data_a", DATA_A)
                .number("limit", "Numero massimo risultati (default: 50)")
                .require(&["esito"]),
            executor,
            votazioni::votings_by_outcome,
        ),
        tool(
            "senato_get_voti_individuali",
            "Ottieni i voti individuali di tutti i senatori per una votazione specifica",
            voting_key_schema(),
            executor,
            votazioni::individual_votes,
        ),
        tool(
            "senato_get_statistiche_votazioni",
            "Ottieni il riepilogo delle votazioni per esito con partecipazione media",
            InputSchema::object()
                .number("legislatura", LEGISLATURA)
                .string("data_da", DATA_DA)
                .string("data_a", DATA_A),
            executor,
            votazioni::voting_statistics,
        ),
    ]
}

fn commission_tools(executor: &Arc<dyn SparqlExecutor>) -> Vec<ToolDefinition> {
    vec![
        tool(
            "senato_get_commissioni_attive",
            "Ottieni l'elenco delle commissioni parlamentari attive al Senato",
            InputSchema::object()
                .string(
                    "ordinale",
                    "Filtra per numero ordinale (es: \"1\", \"2\", etc.) - opzionale",
                )
                .number("limit", "Numero massimo risultati (default: 100)"),
            executor,
            |params: &commissioni::CommissionSearch| Ok(commissioni::active_commissions(params)),
        ),
        tool(
            "senato_get_composizione_commissione",
            "Ottieni la composizione (membri) di una commissione parlamentare",
            InputSchema::object()
                .string(
                    "ordinale",
                    "Numero ordinale commissione (es: \"1\" per 1ª Commissione)",
                )
                .boolean("solo_in_carica", "Solo membri attualmente in carica (default: true)")
                .require(&["ordinale"]),
            executor,
            commissioni::commission_composition,
        ),
        tool(
            "senato_get_commissioni_senatore",
            "Ottieni le commissioni di cui fa o ha fatto parte un senatore",
            InputSchema::object()
                .string("cognome", COGNOME)
                .string("nome", NOME)
                .boolean("solo_in_carica", "Solo commissioni attuali (default: true)")
                .require(&["cognome"]),
            executor,
            commissioni::senator_commissions,
        ),
        tool(
            "senato_cerca_commissioni",
            "Cerca le commissioni attive per parola chiave nella denominazione",
            InputSchema::object()
                .string("termine", "Parola da cercare nel nome della commissione (richiesto)")
                .require(&["termine"]),
            executor,
            commissioni::search_commissions,
        ),
        tool(
            "senato_get_presidenza_commissione",
            "Ottieni presidente, vicepresidenti e segretari in carica di una commissione",
            InputSchema::object()
                .string("ordinale", "Numero ordinale commissione (es: \"1\")")
                .string("commissione_uri", "URI della commissione (alternativo a ordinale)"),
            executor,
            commissioni::commission_leadership,
        ),
        tool(
            "senato_get_statistiche_commissioni",
            "Ottieni il numero di membri in carica di ogni commissione attiva",
            InputSchema::object(),
            executor,
            |_: &NoParams| Ok(commissioni::commission_statistics()),
        ),
    ]
}

fn group_tools(executor: &Arc<dyn SparqlExecutor>) -> Vec<ToolDefinition> {
    vec![
        tool(
            "senato_get_gruppi_attivi",
            "Ottieni l'elenco dei gruppi parlamentari attivi al Senato",
            InputSchema::object().number("limit", "Numero massimo risultati (default: 100)"),
            executor,
            |params: &gruppi::GroupSearch| Ok(gruppi::active_groups(params)),
        ),
        tool(
            "senato_get_composizione_gruppo",
            "Ottieni la composizione (membri) di un gruppo parlamentare",
            InputSchema::object()
                .string(
                    "nome_gruppo",
                    "Nome o parte del nome del gruppo (es: \"Fratelli d'Italia\", \"Lega\")",
                )
                .boolean("solo_in_carica", "Solo membri attualmente in carica (default: true)")
                .require(&["nome_gruppo"]),
            executor,
            gruppi::group_composition,
        ),
        tool(
            "senato_get_gruppi_senatore",
            "Ottieni i gruppi parlamentari di cui fa o ha fatto parte un senatore",
            InputSchema::object()
                .string("cognome", COGNOME)
                .string("nome", NOME)
                .boolean("solo_in_carica", "Solo gruppo attuale (default: true)")
                .require(&["cognome"]),
            executor,
            gruppi::senator_groups,
        ),
        tool(
            "senato_cerca_gruppi",
            "Cerca i gruppi parlamentari attivi per parola chiave nel nome",
            InputSchema::object()
                .string("termine", "Parola da cercare nel nome del gruppo (richiesto)")
                .require(&["termine"]),
            executor,
            gruppi::search_groups,
        ),
        tool(
            "senato_get_presidenza_gruppo",
            "Ottieni presidente e altri incarichi in corso di un gruppo parlamentare",
            InputSchema::object()
                .string("nome_gruppo", "Nome o parte del nome del gruppo")
                .string("gruppo_uri", "URI del gruppo (alternativo a nome_gruppo)"),
            executor,
            gruppi::group_leadership,
        ),
        tool(
            "senato_get_statistiche_gruppi",
            "Ottieni il numero di senatori aderenti a ogni gruppo attivo",
            InputSchema::object(),
            executor,
            |_: &NoParams| Ok(gruppi::group_statistics()),
        ),
        tool(
            "senato_get_cambi_gruppo",
            "Ottieni i senatori che hanno lasciato un gruppo per aderire a un altro",
            InputSchema::object()
                .string("data_da", "Fine adesione precedente da (formato: YYYY-MM-DD) - opzionale")
                .string("data_a", "Fine adesione precedente fino a (formato: YYYY-MM-DD) - opzionale"),
            executor,
            gruppi::group_changes,
        ),
    ]
}

/// Every Senato tool, in catalog order.
#[must_use]
pub fn tools(executor: &Arc<dyn SparqlExecutor>) -> Vec<ToolDefinition> {
    let mut tools = senator_tools(executor);
    tools.extend(bill_tools(executor));
    tools.extend(voting_tools(executor));
    tools.extend(commission_tools(executor));
    tools.extend(group_tools(executor));
    tools.push(raw_query_tool(
        "senato_execute_sparql",
        "Esegue una query SPARQL personalizzata sull'endpoint del Senato della Repubblica. Per utenti avanzati.",
        Institution::Senato,
        executor,
    ));
    tools
}
