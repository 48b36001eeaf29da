//! Fragments shared by both chambers, parameterized by [`InstitutionConfig`].

use republic_sparql::{Filter, Pattern, QueryError, Term, WhereClause};

use crate::institution::{InstitutionConfig, LegislatureAnchor};

/// Name, legislature and mandate constraints for a member lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemberScope<'a> {
    pub cognome: Option<&'a str>,
    pub nome: Option<&'a str>,
    pub legislatura: Option<u32>,
    /// Only mandates without an end date.
    pub active_only: bool,
}

/// Trims a caller string, treating blank input as absent.
#[must_use]
pub fn given(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Like [`given`] but fails when the value is blank.
///
/// # Errors
/// Returns [`QueryError::MissingParameter`] naming `param`.
pub fn require<'a>(value: &'a str, param: &'static str) -> Result<&'a str, QueryError> {
    given(Some(value)).ok_or(QueryError::MissingParameter(param))
}

#[must_use]
pub fn name_filters(cognome: Option<&str>, nome: Option<&str>) -> Vec<Filter> {
    given(cognome)
        .map(|value| Filter::regex("?cognome", value))
        .into_iter()
        .chain(given(nome).map(|value| Filter::regex("?nome", value)))
        .collect()
}

/// `member a <class> ; <surname> ?cognome ; <firstName> ?nome .` plus name regexes.
#[must_use]
pub fn member_names(
    config: &InstitutionConfig,
    cognome: Option<&str>,
    nome: Option<&str>,
) -> WhereClause {
    let ontology = &config.ontology;
    WhereClause::new()
        .pattern(
            Pattern::new(
                "$member a $class ;
  $surname ?cognome ;
  $first ?nome .",
            )
            .bind("member", Term::var(ontology.member_var))
            .bind("class", Term::Name(ontology.member_class))
            .bind("surname", Term::Name(ontology.surname))
            .bind("first", Term::Name(ontology.first_name)),
        )
        .filters(name_filters(cognome, nome))
}

/// `subject <legislatureProperty> <legislature> .`
///
/// # Errors
/// Fails for legislatures outside the supported range.
pub fn in_legislature(
    config: &InstitutionConfig,
    subject: &'static str,
    number: u32,
) -> Result<Pattern, QueryError> {
    Ok(Pattern::new("$subject $property $legislature .")
        .bind("subject", Term::var(subject))
        .bind("property", Term::Name(config.ontology.legislature))
        .bind("legislature", config.legislature(number)?))
}

/// Members with a mandate bound to `?mandato`.
///
/// The legislature constraint lands on the member or on the mandate depending
/// on [`InstitutionConfig::legislature_anchor`].
///
/// # Errors
/// Fails for legislatures outside the supported range.
pub fn members(config: &InstitutionConfig, scope: &MemberScope<'_>) -> Result<WhereClause, QueryError> {
    let ontology = &config.ontology;
    let mut body = member_names(config, scope.cognome, scope.nome).pattern(
        Pattern::new("$member $mandate ?mandato .")
            .bind("member", Term::var(ontology.member_var))
            .bind("mandate", Term::Name(ontology.mandate_relation)),
    );
    if let Some(number) = scope.legislatura {
        let anchor = match config.legislature_anchor {
            LegislatureAnchor::Member => ontology.member_var,
            LegislatureAnchor::Mandate => "?mandato",
        };
        body = body.pattern(in_legislature(config, anchor, number)?);
    }
    if scope.active_only {
        body = body
            .optional(WhereClause::new().pattern(mandate_end(config)))
            .filter(Filter::unbound("?fineMandato"));
    }
    Ok(body)
}

/// `?mandato <start> ?inizioMandato .`
#[must_use]
pub fn mandate_start(config: &InstitutionConfig) -> Pattern {
    Pattern::new("?mandato $start ?inizioMandato .")
        .bind("start", Term::Name(config.ontology.mandate_start))
}

/// `?mandato <end> ?fineMandato .`
#[must_use]
pub fn mandate_end(config: &InstitutionConfig) -> Pattern {
    Pattern::new("?mandato $end ?fineMandato .").bind("end", Term::Name(config.ontology.mandate_end))
}

/// `member <membership> ?adesione . ?adesione <groupRelation> ?gruppo .`
#[must_use]
pub fn group_membership(config: &InstitutionConfig) -> Pattern {
    let ontology = &config.ontology;
    Pattern::new(
        "$member $membership ?adesione .
?adesione $relation ?gruppo .",
    )
    .bind("member", Term::var(ontology.member_var))
    .bind("membership", Term::Name(ontology.group_membership))
    .bind("relation", Term::Name(ontology.group_relation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::institution::{CAMERA, SENATO};

    #[test]
    fn blank_strings_are_absent() {
        assert_eq!(given(Some("  ")), None);
        assert_eq!(given(Some(" Rossi ")), Some("Rossi"));
        assert_eq!(require(" ", "cognome"), Err(QueryError::MissingParameter("cognome")));
    }

    #[test]
    fn camera_members_anchor_legislature_on_the_deputy() {
        let scope = MemberScope {
            cognome: Some("Meloni"),
            legislatura: Some(19),
            active_only: true,
            ..MemberScope::default()
        };
        let body = members(&CAMERA, &scope)
            .expect("valid scope")
            .render(CAMERA.quote);
        assert!(body.starts_with("?deputato a ocd:deputato ;\n  foaf:surname ?cognome ;"));
        assert!(body.contains("FILTER(REGEX(?cognome, 'Meloni', 'i'))"));
        assert!(body.contains(
            "?deputato ocd:rif_leg <http://dati.camera.it/ocd/legislatura.rdf/repubblica_19> ."
        ));
        assert!(body.contains("OPTIONAL { ?mandato ocd:endDate ?fineMandato . }"));
        assert!(body.ends_with("FILTER(!bound(?fineMandato))"));
    }

    #[test]
    fn senato_members_anchor_legislature_on_the_mandate() {
        let scope = MemberScope {
            nome: Some("Liliana"),
            legislatura: Some(19),
            ..MemberScope::default()
        };
        let body = members(&SENATO, &scope)
            .expect("valid scope")
            .render(SENATO.quote);
        assert!(body.contains("foaf:lastName ?cognome"));
        assert!(body.contains("FILTER(REGEX(?nome, \"Liliana\", \"i\"))"));
        assert!(body.contains("?mandato osr:legislatura 19 ."));
        assert!(!body.contains("?fineMandato"));
    }

    #[test]
    fn group_membership_uses_chamber_relation() {
        assert_eq!(
            group_membership(&SENATO).render(SENATO.quote),
            "?senatore ocd:aderisce ?adesione .\n?adesione osr:gruppo ?gruppo ."
        );
        assert!(
            group_membership(&CAMERA)
                .render(CAMERA.quote)
                .contains("ocd:rif_gruppoParlamentare ?gruppo")
        );
    }
}
