//! Cypher statement generation for one article record.
//!
//! Every write is a `MERGE` keyed by the entity's natural key (article URL,
//! stakeholder name, event title, ...), with mutable attributes applied via
//! `SET`. Relationships are merged after both endpoints exist.

use serde_json::{Map, Value, json};

use newsgraph_shared::ArticleRecord;

/// One parameterized Cypher statement for the transactional API.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Statement {
    pub statement: String,
    pub parameters: Map<String, Value>,
}

impl Statement {
    fn new(statement: &str, parameters: Value) -> Self {
        let Value::Object(parameters) = parameters else {
            unreachable!("statement parameters are always a JSON object");
        };
        Self {
            statement: statement.to_string(),
            parameters,
        }
    }
}

/// Build the full statement batch for `record`, article node first.
pub fn statements_for(record: &ArticleRecord) -> Vec<Statement> {
    let mut stmts = Vec::new();
    let url = &record.article.url;

    stmts.push(Statement::new(
        "MERGE (a:Article {url: $url}) \
         SET a.title = $title, a.date_published = $date_published",
        json!({
            "url": url,
            "title": record.article.title,
            "date_published": record.article.date_published,
        }),
    ));

    for s in &record.stakeholders {
        stmts.push(Statement::new(
            "MERGE (s:Stakeholder {name: $name}) SET s.kind = $kind \
             WITH s MATCH (a:Article {url: $url}) MERGE (s)-[:MENTIONED_IN]->(a)",
            json!({
                "name": s.name,
                "kind": s.kind,
                "url": url,
            }),
        ));

        if s.relationships.is_author.is_some() {
            stmts.push(Statement::new(
                "MATCH (s:Stakeholder {name: $name}), (a:Article {url: $url}) \
                 MERGE (s)-[:AUTHORED]->(a)",
                json!({"name": s.name, "url": url}),
            ));
        }

        if let Some(employer) = &s.relationships.is_employed_by {
            stmts.push(Statement::new(
                "MERGE (o:Stakeholder {name: $employer}) SET o.kind = 'organization' \
                 WITH o MATCH (s:Stakeholder {name: $name}) MERGE (s)-[:EMPLOYED_BY]->(o)",
                json!({"employer": employer, "name": s.name}),
            ));
        }

        if let Some(institution) = &s.relationships.has_role_in {
            stmts.push(Statement::new(
                "MERGE (i:Institution {name: $institution}) \
                 WITH i MATCH (s:Stakeholder {name: $name}) \
                 MERGE (s)-[r:HAS_ROLE_IN]->(i) SET r.role = $role",
                json!({
                    "institution": institution,
                    "name": s.name,
                    "role": s.relationships.has_role,
                }),
            ));
        }

        for event_title in &s.relationships.participated_in {
            stmts.push(Statement::new(
                "MERGE (e:Event {title: $event}) \
                 WITH e MATCH (s:Stakeholder {name: $name}) \
                 MERGE (s)-[:PARTICIPATED_IN]->(e)",
                json!({"event": event_title, "name": s.name}),
            ));
        }

        if let Some(controversy) = &s.relationships.related_to {
            stmts.push(Statement::new(
                "MERGE (c:Controversy {summary: $summary}) \
                 WITH c MATCH (s:Stakeholder {name: $name}) \
                 MERGE (s)-[:RELATED_TO]->(c)",
                json!({"summary": controversy, "name": s.name}),
            ));
        }

        for q in &s.quotes {
            stmts.push(Statement::new(
                "MERGE (q:Quote {text: $text}) \
                 SET q.date_recorded = $date_recorded, q.context = $context \
                 WITH q MATCH (s:Stakeholder {name: $name}) MERGE (s)-[:SAID]->(q)",
                json!({
                    "text": q.text,
                    "date_recorded": q.date_recorded,
                    "context": q.context,
                    "name": s.name,
                }),
            ));
        }
    }

    for e in &record.events {
        stmts.push(Statement::new(
            "MERGE (e:Event {title: $title}) \
             SET e.date = $date, e.description = $description \
             WITH e MATCH (a:Article {url: $url}) MERGE (e)-[:REPORTED_IN]->(a)",
            json!({
                "title": e.title,
                "date": e.date,
                "description": e.description,
                "url": url,
            }),
        ));
    }

    for f in &record.facts {
        stmts.push(Statement::new(
            "MERGE (f:Fact {fact: $fact}) \
             SET f.summary = $summary, f.description = $description \
             WITH f MATCH (a:Article {url: $url}) MERGE (f)-[:REPORTED_IN]->(a)",
            json!({
                "fact": f.fact,
                "summary": f.summary,
                "description": f.description,
                "url": url,
            }),
        ));
    }

    for i in &record.issues {
        stmts.push(Statement::new(
            "MERGE (i:Issue {title: $title}) SET i.objective = $objective \
             WITH i MATCH (a:Article {url: $url}) MERGE (i)-[:RAISED_IN]->(a)",
            json!({"title": i.title, "objective": i.objective, "url": url}),
        ));
    }

    for d in &record.documents {
        stmts.push(Statement::new(
            "MERGE (d:Document {title: $title}) SET d.description = $description \
             WITH d MATCH (a:Article {url: $url}) MERGE (d)-[:MENTIONED_IN]->(a)",
            json!({"title": d.title, "description": d.description, "url": url}),
        ));
    }

    for c in &record.controversies {
        stmts.push(Statement::new(
            "MERGE (c:Controversy {summary: $summary}) \
             SET c.kind = $kind, c.description = $description \
             WITH c MATCH (a:Article {url: $url}) MERGE (c)-[:REPORTED_IN]->(a)",
            json!({
                "summary": c.summary,
                "kind": c.kind,
                "description": c.description,
                "url": url,
            }),
        ));
    }

    for inst in &record.institutions {
        stmts.push(Statement::new(
            "MERGE (i:Institution {name: $name}) SET i.kind = $kind \
             WITH i MATCH (a:Article {url: $url}) MERGE (i)-[:MENTIONED_IN]->(a)",
            json!({"name": inst.name, "kind": inst.kind, "url": url}),
        ));
    }

    stmts
}
