//! Tools backed by the Camera dei Deputati endpoint.

use std::sync::Arc;

use republic_sparql::{QueryError, SparqlExecutor};
use serde::de::DeserializeOwned;

use crate::institution::Institution;
use crate::queries::camera::{atti, deputati, interventi, organi, votazioni};
use crate::tool::{InputSchema, ToolDefinition};
use crate::tools::{raw_query_tool, select_tool};

const LEGISLATURA: &str = "Legislatura (default: 19)";
const COGNOME: &str = "Cognome del deputato";
const NOME: &str = "Nome del deputato (opzionale)";

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
    select_tool(name, description, Institution::Camera, schema, executor, build)
}

fn deputy_tools(executor: &Arc<dyn SparqlExecutor>) -> Vec<ToolDefinition> {
    vec![
        tool(
            "search_deputati",
            "Cerca deputati della Camera per nome, cognome o legislatura. Restituisce informazioni biografiche, gruppo parlamentare e collegio elettorale.",
            InputSchema::object()
                .string("nome", NOME)
                .string("cognome", "Cognome del deputato (opzionale)")
                .number("legislatura", "Legislatura (es: 19 per la XIX legislatura, default: 19)")
                .string("gruppo", "Nome o sigla del gruppo parlamentare (opzionale)")
                .number("limit", "Numero massimo di risultati (default: 100)"),
            executor,
            deputati::search_deputies,
        ),
        tool(
            "get_deputato_info",
            "Ottiene informazioni dettagliate su un deputato specifico dato il suo URI. Include biografia, mandati, gruppo parlamentare, commissioni e incarichi.",
            InputSchema::object()
                .string(
                    "uri",
                    "URI completo del deputato (es: http://dati.camera.it/ocd/deputato.rdf/d123_19)",
                )
                .require(&["uri"]),
            executor,
            deputati::deputy_details,
        ),
        tool(
            "get_mandati_deputato",
            "Ottieni i mandati di un deputato nelle diverse legislature, con date di inizio e fine.",
            InputSchema::object()
                .string("cognome", COGNOME)
                .string("nome", NOME)
                .number("legislatura", "Legislatura (opzionale)")
                .require(&["cognome"]),
            executor,
            deputati::deputy_mandates,
        ),
        tool(
            "get_deputati_per_gruppo",
            "Ottieni i deputati aderenti a un gruppo parlamentare.",
            InputSchema::object()
                .string("gruppo", "Nome o sigla del gruppo parlamentare")
                .number("legislatura", LEGISLATURA)
                .boolean("solo_in_carica", "Solo adesioni in corso (default: true)")
                .require(&["gruppo"]),
            executor,
            deputati::deputies_by_group,
        ),
        tool(
            "get_incarichi_governo_deputati",
            "Ottieni gli incarichi di governo ricoperti dai deputati.",
            InputSchema::object()
                .number("legislatura", LEGISLATURA)
                .string("cognome", "Cognome del deputato (opzionale, per filtrare)")
                .string("nome", "Nome del deputato (opzionale, per filtrare)"),
            executor,
            deputati::government_roles,
        ),
    ]
}

fn act_tools(executor: &Arc<dyn SparqlExecutor>) -> Vec<ToolDefinition> {
    vec![
        tool(
            "search_atti",
            "Cerca atti parlamentari (disegni di legge, proposte, mozioni) per titolo, tipo o legislatura.",
            InputSchema::object()
                .string("titolo", "Parole chiave nel titolo dell'atto (opzionale)")
                .string("tipo", "Tipo di atto (es: 'disegno di legge', 'mozione', opzionale)")
                .number("legislatura", LEGISLATURA)
                .string("iniziativa", "Iniziativa (es: 'Governo', 'Parlamentare', opzionale)")
                .string("stato", "Stato dell'iter (opzionale)")
                .boolean("concluso", "Solo atti con iter concluso (true) o in corso (false)")
                .boolean("costituzionale", "Solo proposte di legge costituzionale (opzionale)")
                .string("data_da", "Data presentazione iniziale (formato: YYYYMMDD o YYYY-MM-DD)")
                .string("data_a", "Data presentazione finale (formato: YYYYMMDD o YYYY-MM-DD)")
                .number("limit", "Numero massimo di risultati (default: 20)"),
            executor,
            atti::search_acts,
        ),
        tool(
            "get_atto_info",
            "Ottiene informazioni dettagliate su un atto parlamentare specifico, incluse le fasi dell'iter, i proponenti e le votazioni.",
            InputSchema::object()
                .string(
                    "uri",
                    "URI completo dell'atto (es: http://dati.camera.it/ocd/attocamera.rdf/ac19_1234)",
                )
                .require(&["uri"]),
            executor,
            atti::act_details,
        ),
        tool(
            "get_atti_con_fasi",
            "Ottieni atti con le loro fasi di iter e date di approvazione. Utile per seguire l'evoluzione legislativa.",
            InputSchema::object()
                .number("legislatura", LEGISLATURA)
                .string("data_da", "Data inizio periodo (formato: YYYYMMDD)")
                .string("data_a", "Data fine periodo (formato: YYYYMMDD)")
                .number("limit", "Numero massimo di risultati (default: 100)"),
            executor,
            atti::acts_with_phases,
        ),
        tool(
            "get_atti_deputato",
            "Ottieni gli atti presentati da un deputato come primo firmatario o cofirmatario.",
            InputSchema::object()
                .string("cognome", COGNOME)
                .string("nome", NOME)
                .number("legislatura", LEGISLATURA)
                .string(
                    "ruolo",
                    "Ruolo: \"primo_firmatario\", \"altro_firmatario\", o \"both\" (default: both)",
                )
                .number("limit", "Numero massimo di risultati (default: 100)")
                .require(&["cognome"]),
            executor,
            atti::deputy_acts,
        ),
        tool(
            "get_firmatari_atto",
            "Ottieni i firmatari (primo firmatario e cofirmatari) di un atto.",
            InputSchema::object()
                .string("uri", "URI completo dell'atto")
                .require(&["uri"]),
            executor,
            atti::act_signatories,
        ),
    ]
}

fn voting_tools(executor: &Arc<dyn SparqlExecutor>) -> Vec<ToolDefinition> {
    vec![
        tool(
            "get_votazioni",
            "Ottiene le votazioni recenti o relative ad un atto specifico.",
            InputSchema::object()
                .string(
                    "atto_uri",
                    "URI dell'atto (opzionale, per filtrare votazioni su un atto specifico)",
                )
                .string("data_da", "Data inizio nel formato YYYYMMDD (opzionale)")
                .string("data_a", "Data fine nel formato YYYYMMDD (opzionale)")
                .boolean("approvato", "Solo votazioni approvate (true) o respinte (false)")
                .boolean("finale", "Solo votazioni finali (opzionale)")
                .number("limit", "Numero massimo di risultati (default: 20)"),
            executor,
            votazioni::votings,
        ),
        tool(
            "get_espressioni_voto",
            "Ottieni i dettagli di voto di ogni deputato per una specifica votazione.",
            InputSchema::object()
                .string("data", "Data votazione (formato: YYYYMMDD, es: 20140611)")
                .string("numero", "Numero votazione (es: 001)")
                .require(&["data", "numero"]),
            executor,
            votazioni::vote_expressions,
        ),
        tool(
            "get_statistiche_voto_deputato",
            "Ottieni statistiche sui voti di un deputato (favorevoli, contrari, astenuti, etc).",
            InputSchema::object()
                .string("cognome", COGNOME)
                .string("nome", NOME)
                .number("legislatura", LEGISLATURA)
                .string(
                    "tipo_voto",
                    "Tipo voto: \"Favorevole\", \"Contrario\", \"Astensione\", \"Ha votato\", \"Non ha votato\"",
                )
                .string("data_da", "Data inizio periodo (formato: YYYYMMDD)")
                .string("data_a", "Data fine periodo (formato: YYYYMMDD)")
                .require(&["cognome"]),
            executor,
            votazioni::deputy_vote_stats,
        ),
    ]
}

fn organ_tools(executor: &Arc<dyn SparqlExecutor>) -> Vec<ToolDefinition> {
    vec![
        tool(
            "get_gruppi_parlamentari",
            "Ottiene la lista dei gruppi parlamentari per una determinata legislatura.",
            InputSchema::object().number("legislatura", LEGISLATURA),
            executor,
            organi::parliamentary_groups,
        ),
        tool(
            "get_commissioni",
            "Ottiene la lista delle commissioni e organi parlamentari.",
            InputSchema::object()
                .number("legislatura", LEGISLATURA)
                .string("tipo", "Tipo di organo (es: 'commissione', opzionale)")
                .boolean("solo_attivi", "Solo organi ancora attivi (default: false)")
                .number("limit", "Numero massimo di risultati (default: 100)"),
            executor,
            organi::organs,
        ),
        tool(
            "get_incarichi_gruppi_parlamentari",
            "Ottieni gli incarichi nei gruppi parlamentari con date di inizio e fine.",
            InputSchema::object().number("legislatura", LEGISLATURA),
            executor,
            organi::group_positions,
        ),
        tool(
            "get_incarichi_organi_parlamentari",
            "Ottieni gli incarichi negli organi parlamentari (commissioni, etc) con date.",
            InputSchema::object().number("legislatura", LEGISLATURA),
            executor,
            organi::organ_positions,
        ),
        tool(
            "get_governi",
            "Ottiene informazioni sui governi della Repubblica.",
            InputSchema::object()
                .boolean("solo_in_carica", "Solo il governo in carica (default: false)")
                .number("limit", "Numero massimo di risultati (default: 50)"),
            executor,
            |params: &organi::GovernmentSearch| Ok(organi::governments(params)),
        ),
        tool(
            "get_governo_membri",
            "Ottiene i membri di un governo specifico.",
            InputSchema::object()
                .string("uri", "URI del governo")
                .require(&["uri"]),
            executor,
            organi::government_members,
        ),
    ]
}

fn speech_tools(executor: &Arc<dyn SparqlExecutor>) -> Vec<ToolDefinition> {
    vec![
        tool(
            "search_interventi",
            "Cerca interventi in aula su un argomento specifico. Restituisce i deputati che sono intervenuti e le relative sedute.",
            InputSchema::object()
                .string("argomento", "Argomento o parola chiave da cercare negli interventi")
                .number("legislatura", LEGISLATURA)
                .number("limit", "Numero massimo di risultati (default: 20)")
                .require(&["argomento"]),
            executor,
            interventi::search_speeches,
        ),
        tool(
            "get_interventi_per_argomento",
            "Cerca interventi in aula per argomento, con possibilità di filtrare per deputato.",
            InputSchema::object()
                .string("argomento", "Argomento o parola chiave (es: 'immigrazione', 'sanità')")
                .number("legislatura", LEGISLATURA)
                .string("cognome", "Cognome deputato (opzionale, per filtrare)")
                .string("nome", "Nome deputato (opzionale, per filtrare)")
                .number("limit", "Numero massimo di risultati (default: 50)")
                .require(&["argomento"]),
            executor,
            interventi::speeches_by_topic,
        ),
    ]
}

/// Every Camera tool, in catalog order.
#[must_use]
pub fn tools(executor: &Arc<dyn SparqlExecutor>) -> Vec<ToolDefinition> {
    let mut tools = deputy_tools(executor);
    tools.extend(act_tools(executor));
    tools.extend(voting_tools(executor));
    tools.extend(organ_tools(executor));
    tools.extend(speech_tools(executor));
    tools.push(raw_query_tool(
        "execute_sparql",
        "Esegue una query SPARQL personalizzata sull'endpoint della Camera dei Deputati. Per utenti avanzati.",
        Institution::Camera,
        executor,
    ));
    tools
}
