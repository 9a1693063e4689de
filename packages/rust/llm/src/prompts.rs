//! Prompt templates for the LLM capabilities.

/// System prompt for structured article extraction.
///
/// The output template mirrors the serde schema of `ArticleRecord` exactly;
/// any deviation fails parsing and the item is dropped.
pub const EXTRACTION_SYSTEM_PROMPT: &str = r#"Task:
Ingest the article text provided by the user and extract data to populate a
knowledge graph. Categorize the data into these entities: article,
stakeholders, events, facts, issues, documents, controversies, institutions.

Your objectives:
1. Extract relevant information for each entity category.
2. Establish relationships between entities where applicable.
3. Produce valid JSON matching the template below exactly.
4. Be precise and thorough; do not invent information absent from the text.

Extraction requirements:
- article: title, url (use the URL provided by the user), date_published in
  "mm/dd/yyyy" format if present.
- stakeholders: name; kind ("person" or "organization"); relationships
  (mentioned_in: article title; is_author: name if the stakeholder wrote the
  article; is_employed_by: employer organization; has_role_in: institution;
  has_role: the specific role there; participated_in: list of event titles;
  related_to: related controversy summary); quotes attributed to the
  stakeholder (text, date_recorded as the article's publication date,
  context explaining the quote's use).
- events: title, date ("mm/dd/yyyy"), description, participants.
- facts: fact, summary (one sentence), description.
- issues: title, objective (inferred goal of the issue).
- documents: title, description (why the document was mentioned).
- controversies: summary, description, kind ("legal", "social", or "moral").
- institutions: name, kind (governmental, regulatory, economic, political,
  education and research, social, or military institution, with the specific
  branch or sector).

Output format (JSON, no surrounding prose, no markdown fences):
{
  "article": {"title": "", "url": "", "date_published": "mm/dd/yyyy"},
  "stakeholders": [
    {
      "name": "",
      "kind": "person",
      "relationships": {
        "mentioned_in": "",
        "is_author": null,
        "is_employed_by": null,
        "has_role_in": null,
        "has_role": null,
        "participated_in": [],
        "related_to": null
      },
      "quotes": [{"text": "", "date_recorded": "mm/dd/yyyy", "context": ""}]
    }
  ],
  "events": [{"title": "", "date": "mm/dd/yyyy", "description": "", "participants": []}],
  "facts": [{"fact": "", "summary": "", "description": ""}],
  "issues": [{"title": "", "objective": ""}],
  "documents": [{"title": "", "description": ""}],
  "controversies": [{"summary": "", "description": "", "kind": "legal"}],
  "institutions": [{"name": "", "kind": ""}]
}
Omit entity arrays that have no entries."#;

/// System prompt for record review.
pub const REVIEW_SYSTEM_PROMPT: &str = r#"You are a data reviewer for a knowledge graph
ingestion pipeline. Review the extracted record provided by the user for:
- syntactic validity (required fields present and correctly typed),
- entity classification correctness (people vs. organizations, institution
  kinds, controversy kinds),
- relationship accuracy (relationships reference entities in the record),
- internal consistency (dates, titles, and names agree across entities).

Respond with JSON only, no surrounding prose, no markdown fences:
{"valid": true, "reasons": []}
or
{"valid": false, "reasons": ["<each problem found>"]}"#;

/// System prompt for search-term generation from a user query.
pub const TERM_GENERATION_SYSTEM_PROMPT: &str = r#"Generate 5 search terms that would be
effective for finding relevant news articles about the topic in the user's
query. Provide the search terms as a comma-separated list. Do not include any
other text or explanation in your response."#;

/// System prompt for choosing the search strategy.
pub const STRATEGY_SELECTION_SYSTEM_PROMPT: &str = r#"Based on the user query and the
generated search terms, decide which search engine is better suited to
retrieve relevant article URLs.

Respond with exactly one word:
- "contextual" if a research-oriented search API (deep, topic-specific
  sources) is better suited,
- "general" if a broad news search engine is better suited.

Do not include any other text or explanation in your response."#;

/// Build the user message for an extraction call.
pub fn extraction_user_prompt(url: &str, article_text: &str) -> String {
    format!("Article URL: {url}\n\nArticle text:\n{article_text}")
}

/// Build the user message for a review call.
pub fn review_user_prompt(record_json: &str) -> String {
    format!("Extracted record:\n{record_json}")
}

/// Build the user message for a strategy-selection call.
pub fn strategy_user_prompt(query: &str, terms: &[String]) -> String {
    format!(
        "User query:\n\"{query}\"\n\nGenerated search terms:\n{}",
        terms.join(", ")
    )
}
