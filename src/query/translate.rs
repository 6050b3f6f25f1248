//! Translation of predicate trees into index queries.

use std::sync::Arc;

use log::trace;

use crate::analysis::{Analyzer, StandardAnalyzer, token_texts};
use crate::dictionary::{DataType, Dictionary, NamespacePrefixResolver, QName};
use crate::error::{DocQueryError, Result};
use crate::query::encode::{encode_literal, literal_text};
use crate::query::field_resolver::{FIELD_PARENT, FIELD_TYPE, FieldResolver, ResolvedField};
use crate::query::index_query::{
    BooleanQuery, BooleanQueryBuilder, Bound, IndexQuery, SortField, SortOrder,
};
use crate::query::params::{Operator, SearchParameters};
use crate::query::predicate::{CompareOp, Predicate, SortKey, SortSpec, Value};

/// Borrowed view of a context's configuration used for one translation.
pub(crate) struct Translator<'a> {
    pub resolver: &'a FieldResolver,
    pub dictionary: &'a dyn Dictionary,
    pub namespaces: &'a dyn NamespacePrefixResolver,
    pub params: &'a SearchParameters,
    pub full_text_analyzer: &'a Arc<dyn Analyzer>,
    pub allow_leading_wildcard: bool,
}

/// Analyzer for full-text expressions: standard analysis that leaves
/// wildcard characters inside terms.
pub(crate) fn full_text_analyzer() -> Arc<dyn Analyzer> {
    Arc::new(StandardAnalyzer::with_wildcards())
}

/// Convert a LIKE pattern to wildcard syntax.
pub(crate) fn like_to_wildcard(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some(escaped @ ('*' | '?' | '\\')) => {
                    out.push('\\');
                    out.push(escaped);
                }
                Some(escaped) => out.push(escaped),
                None => out.push_str("\\\\"),
            },
            '%' => out.push('*'),
            '_' => out.push('?'),
            '*' | '?' => {
                out.push('\\');
                out.push(ch);
            }
            other => out.push(other),
        }
    }
    out
}

fn has_wildcard(term: &str) -> bool {
    term.contains('*') || term.contains('?')
}

fn starts_with_wildcard(pattern: &str) -> bool {
    pattern.starts_with('*') || pattern.starts_with('?')
}

impl<'a> Translator<'a> {
    pub fn translate(&self, predicate: &Predicate) -> Result<IndexQuery> {
        let query = match predicate {
            Predicate::And(children) => {
                if children.is_empty() {
                    return Ok(IndexQuery::MatchAll);
                }
                if children.len() == 1 {
                    return self.translate(&children[0]);
                }
                let mut query = BooleanQuery::new();
                for child in children {
                    query.add_must(self.translate(child)?);
                }
                IndexQuery::Boolean(query)
            }
            Predicate::Or(children) => {
                if children.is_empty() {
                    return Err(DocQueryError::translation(
                        predicate.to_string(),
                        "empty disjunction",
                    ));
                }
                let alternatives = children
                    .iter()
                    .map(|child| self.translate(child))
                    .collect::<Result<Vec<_>>>()?;
                IndexQuery::any_of(alternatives)
            }
            Predicate::Not(child) => IndexQuery::negate(self.translate(child)?),
            Predicate::Compare {
                property,
                op,
                value,
            } => {
                let field = self.resolve(property, predicate)?;
                self.compare(&field, *op, value, predicate)?
            }
            Predicate::In {
                property,
                values,
                negated,
            } => {
                if values.is_empty() {
                    return Err(DocQueryError::translation(predicate.to_string(), "empty IN list"));
                }
                let field = self.resolve(property, predicate)?;
                let equals = values
                    .iter()
                    .map(|value| self.equals(&field, value, predicate))
                    .collect::<Result<Vec<_>>>()?;
                if *negated {
                    let mut query = BooleanQuery::new();
                    query.add_must(exists(&field));
                    for excluded in equals {
                        query.add_must_not(excluded);
                    }
                    IndexQuery::Boolean(query)
                } else {
                    IndexQuery::any_of(equals)
                }
            }
            Predicate::Like {
                property,
                pattern,
                negated,
            } => {
                let field = self.resolve(property, predicate)?;
                let like = self.like(&field, pattern, predicate)?;
                if *negated {
                    IndexQuery::Boolean(
                        BooleanQueryBuilder::new()
                            .must(exists(&field))
                            .must_not(like)
                            .build(),
                    )
                } else {
                    like
                }
            }
            Predicate::Exists { property } => exists(&self.resolve(property, predicate)?),
            Predicate::IsNull { property } => {
                IndexQuery::negate(exists(&self.resolve(property, predicate)?))
            }
            Predicate::FullText { property, text } => {
                let name = property.as_deref().unwrap_or(&self.params.default_field);
                let field = self.resolve(name, predicate)?;
                self.full_text(&field, text, predicate)?
            }
            Predicate::InFolder(folder) => IndexQuery::term(FIELD_PARENT, folder.clone()),
            Predicate::IsType(type_name) => self.is_type(type_name, predicate)?,
        };
        trace!("translated {predicate} -> {query}");
        Ok(query)
    }

    pub fn translate_sort(&self, sort: &SortSpec) -> Result<Vec<SortField>> {
        sort.terms()
            .iter()
            .map(|term| {
                let order = if term.ascending {
                    SortOrder::Asc
                } else {
                    SortOrder::Desc
                };
                match &term.key {
                    SortKey::Score => Ok(SortField::Score { order }),
                    SortKey::Property(property) => {
                        let field = self.resolver.resolve(property, None).map_err(|e| {
                            self.name_error(e, &format!("ORDER BY {property}"))
                        })?;
                        if field.data_type == DataType::Content {
                            return Err(DocQueryError::translation(
                                format!("ORDER BY {property}"),
                                "content properties are not sortable",
                            ));
                        }
                        Ok(SortField::Field {
                            name: field.fields[0].clone(),
                            order,
                        })
                    }
                }
            })
            .collect()
    }

    fn name_error(&self, error: DocQueryError, node: &str) -> DocQueryError {
        match error {
            DocQueryError::Dictionary(reason) => DocQueryError::translation(node, reason),
            other => other,
        }
    }

    fn resolve(&self, property: &str, node: &Predicate) -> Result<ResolvedField> {
        self.resolver
            .resolve(property, None)
            .map_err(|e| self.name_error(e, &node.to_string()))
    }

    fn compare(
        &self,
        field: &ResolvedField,
        op: CompareOp,
        value: &Value,
        node: &Predicate,
    ) -> Result<IndexQuery> {
        let unsupported = || {
            DocQueryError::translation(
                node.to_string(),
                format!("operator {op} is not supported for {} properties", field.data_type),
            )
        };

        match op {
            CompareOp::Eq => self.equals(field, value, node),
            CompareOp::Ne => {
                let equal = self.equals(field, value, node)?;
                Ok(IndexQuery::Boolean(
                    BooleanQueryBuilder::new()
                        .must(exists(field))
                        .must_not(equal)
                        .build(),
                ))
            }
            CompareOp::Lt | CompareOp::Le | CompareOp::Gt | CompareOp::Ge => {
                if !field.data_type.supports_range() {
                    return Err(unsupported());
                }
                let term = self.range_term(field, value, node)?;
                let (lower, upper) = match op {
                    CompareOp::Lt => (Bound::Unbounded, Bound::Excluded(term)),
                    CompareOp::Le => (Bound::Unbounded, Bound::Included(term)),
                    CompareOp::Gt => (Bound::Excluded(term), Bound::Unbounded),
                    _ => (Bound::Included(term), Bound::Unbounded),
                };
                Ok(across_fields(field, |name| IndexQuery::Range {
                    field: name.to_string(),
                    lower: lower.clone(),
                    upper: upper.clone(),
                }))
            }
        }
    }

    fn equals(&self, field: &ResolvedField, value: &Value, node: &Predicate) -> Result<IndexQuery> {
        if !field.data_type.supports_equality() {
            return Err(DocQueryError::translation(
                node.to_string(),
                format!("operator = is not supported for {} properties", field.data_type),
            ));
        }

        if field.data_type.is_textual() {
            let terms = token_texts(field.analyzer.analyze(&literal_text(value))?);
            return match terms.len() {
                0 => Err(DocQueryError::translation(
                    node.to_string(),
                    "literal produces no index terms",
                )),
                1 => Ok(across_fields(field, |name| IndexQuery::term(name, terms[0].clone()))),
                _ => Ok(across_fields(field, |name| IndexQuery::Phrase {
                    field: name.to_string(),
                    terms: terms.clone(),
                })),
            };
        }

        let encoded = encode_literal(field.data_type, value)
            .map_err(|reason| DocQueryError::translation(node.to_string(), reason))?;
        Ok(across_fields(field, |name| IndexQuery::term(name, encoded.clone())))
    }

    fn range_term(&self, field: &ResolvedField, value: &Value, node: &Predicate) -> Result<String> {
        if field.data_type == DataType::Text {
            let text = literal_text(value);
            return Ok(if field.analyzer.lowercases() {
                text.to_lowercase()
            } else {
                text
            });
        }
        encode_literal(field.data_type, value)
            .map_err(|reason| DocQueryError::translation(node.to_string(), reason))
    }

    fn like(&self, field: &ResolvedField, pattern: &str, node: &Predicate) -> Result<IndexQuery> {
        if !field.data_type.supports_like() {
            return Err(DocQueryError::translation(
                node.to_string(),
                format!("LIKE is not supported for {} properties", field.data_type),
            ));
        }
        let mut wildcard = like_to_wildcard(pattern);
        if field.analyzer.lowercases() {
            wildcard = wildcard.to_lowercase();
        }
        self.check_leading_wildcard(&wildcard, node)?;
        Ok(across_fields(field, |name| IndexQuery::Wildcard {
            field: name.to_string(),
            pattern: wildcard.clone(),
        }))
    }

    fn full_text(&self, field: &ResolvedField, text: &str, node: &Predicate) -> Result<IndexQuery> {
        let analyzer = if field.data_type.is_textual() {
            self.full_text_analyzer
        } else {
            &field.analyzer
        };
        let terms = token_texts(analyzer.analyze(text)?);
        if terms.is_empty() {
            return Err(DocQueryError::translation(
                node.to_string(),
                "full-text expression produces no terms",
            ));
        }

        let mut per_term = Vec::with_capacity(terms.len());
        for term in &terms {
            if has_wildcard(term) {
                self.check_leading_wildcard(term, node)?;
                per_term.push(across_fields(field, |name| IndexQuery::Wildcard {
                    field: name.to_string(),
                    pattern: term.clone(),
                }));
            } else {
                per_term.push(across_fields(field, |name| IndexQuery::term(name, term.clone())));
            }
        }

        if per_term.len() == 1 {
            return Ok(per_term.remove(0));
        }
        Ok(match self.params.default_operator {
            Operator::Or => IndexQuery::any_of(per_term),
            Operator::And => {
                let mut query = BooleanQuery::new();
                for term in per_term {
                    query.add_must(term);
                }
                IndexQuery::Boolean(query)
            }
        })
    }

    fn is_type(&self, type_name: &str, node: &Predicate) -> Result<IndexQuery> {
        let name = QName::resolve(type_name, self.namespaces)
            .map_err(|e| self.name_error(e, &node.to_string()))?;
        if !self.dictionary.type_exists(&name) {
            return Err(DocQueryError::translation(
                node.to_string(),
                format!("unknown type {name}"),
            ));
        }
        let alternatives = self
            .dictionary
            .subtypes(&name)
            .into_iter()
            .map(|subtype| IndexQuery::term(FIELD_TYPE, subtype.to_string()))
            .collect();
        Ok(IndexQuery::any_of(alternatives))
    }

    fn check_leading_wildcard(&self, pattern: &str, node: &Predicate) -> Result<()> {
        if !self.allow_leading_wildcard && starts_with_wildcard(pattern) {
            return Err(DocQueryError::translation(
                node.to_string(),
                "leading wildcards are not allowed",
            ));
        }
        Ok(())
    }
}

fn exists(field: &ResolvedField) -> IndexQuery {
    across_fields(field, |name| IndexQuery::Exists {
        field: name.to_string(),
    })
}

/// Apply `build` to every resolved field, OR-ing the results.
fn across_fields<F>(field: &ResolvedField, build: F) -> IndexQuery
where
    F: Fn(&str) -> IndexQuery,
{
    IndexQuery::any_of(field.fields.iter().map(|name| build(name)).collect())
}
