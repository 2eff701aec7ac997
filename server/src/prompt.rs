//! Prompt compositor
//!
//! Builds the single text block handed to the completion backend: search
//! timestamps, a direct answer when the aggregator found one, numbered
//! source excerpts, the list of images available for citation, the fixed
//! formatting instructions, and the literal sources table the model is
//! told to reproduce verbatim at the end of its report.

use chrono::{DateTime, Local, Utc};
use farsight_search::{SearchResponse, SearchResult};

const DESCRIPTION_LIMIT: usize = 150;

const FORMATTING_GUIDELINES: &str = r#"Formatting Guidelines:
1. Structure:
   - Use H1 (#) for main titles
   - Use H2 (##) for major sections
   - Use H3 (###) for subsections
   - Break content into clear, logical sections

2. Text Styling:
   - Use **bold** for emphasis on key points
   - Use *italic* for definitions or subtle emphasis
   - Use `code` for technical terms or data
   - Use > for important quotes or highlights

3. Lists:
   - Use bullet points for related items
   - Use numbered lists for sequential steps
   - Indent sub-points for hierarchy

4. Media Integration:
   - Include up to 3 relevant images using any of these formats:
     1. HTML: <img src="IMAGE_URL" alt="DESCRIPTIVE_TEXT" />
     2. Markdown: ![DESCRIPTIVE_TEXT](IMAGE_URL)
     3. Reference: [Image X]: IMAGE_URL
   - Place images naturally within the content
   - Only use images from the provided URLs above
   - Include descriptive alt text for accessibility

5. Citations:
   - Use inline citations [Source X] for claims
   - Link to sources using [text](URL) format
   - Include a sources table at the end

6. Tables:
   - Use markdown tables for structured data
   - Include headers and align columns
   - Keep tables focused and readable

Always end your response with a sources table listing all references used. Format it exactly as shown below:"#;

/// Compose with the current wall-clock timestamps
pub fn report_prompt(query: &str, search: &SearchResponse) -> String {
    compose_report_prompt(query, search, Local::now(), Utc::now())
}

/// Compose the report prompt from fixed inputs
pub fn compose_report_prompt(
    query: &str,
    search: &SearchResponse,
    local: DateTime<Local>,
    utc: DateTime<Utc>,
) -> String {
    let local_time = local.format("%A, %B %-d, %Y at %-I:%M:%S %p %Z");
    let utc_time = utc.format("%A, %B %-d, %Y at %-I:%M:%S %p UTC");

    let direct_answer = search
        .answer
        .as_deref()
        .filter(|answer| !answer.is_empty())
        .map(|answer| format!("\nDirect Answer: {answer}\n\n"))
        .unwrap_or_default();

    let search_context = search
        .results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            format!(
                "[Source {}]: {}\n{}\nURL: {}\n",
                i + 1,
                result.title,
                result.content,
                result.url
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    // Image numbering counts only results that actually carry an image
    let image_list = search
        .results
        .iter()
        .filter_map(|result| {
            result
                .image
                .as_ref()
                .filter(|image| !image.url.is_empty())
                .map(|image| (image, result))
        })
        .enumerate()
        .map(|(i, (image, result))| {
            format!("[Image {}]: {} - From source: {}", i + 1, image.url, result.title)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Search performed on:\n\
         Local Time: {local_time}\n\
         UTC: {utc_time}\n\
         \n\
         Here is the research data:{direct_answer}\n\
         {search_context}\n\
         \n\
         Please analyze this information and create a detailed report addressing the original query: \"{query}\". Include citations to the sources where appropriate.\n\
         \n\
         Available Images from Search Results:\n\
         {image_list}\n\
         \n\
         {FORMATTING_GUIDELINES}\n\
         {sources_table}",
        sources_table = sources_table(&search.results),
    )
}

/// The literal markdown table the model is instructed to reproduce at
/// the end of its answer
fn sources_table(results: &[SearchResult]) -> String {
    let rows = results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            let description = result
                .snippet
                .as_deref()
                .filter(|snippet| !snippet.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| truncate(&result.content, DESCRIPTION_LIMIT));
            format!("| {} | [{}]({}) | {} |", i + 1, result.title, result.url, description)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "\n\n<div style=\"clear: both\"></div>\n## Sources\n\n\
         | Number | Source | Description |\n\
         |:---------|:---------|:-------------|\n\
         {rows}\n"
    )
}

fn truncate(content: &str, limit: usize) -> String {
    if content.chars().count() <= limit {
        content.to_string()
    } else {
        let cut: String = content.chars().take(limit).collect();
        format!("{cut}...")
    }
}
