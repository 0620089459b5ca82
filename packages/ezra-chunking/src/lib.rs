use ezra_domain::docs::{DocumentationChunk, DocumentationMetadata};

const INTRO_TITLE: &str = "Introduction";

#[derive(Clone, Debug, PartialEq)]
pub struct MarkdownChunk {
	pub title: String,
	pub content: String,
}

/// Reproducible from (url, section title) alone, so re-ingesting the same
/// logical section overwrites instead of duplicating.
pub fn chunk_id(url: &str, section_title: &str) -> String {
	let digest = blake3::hash(format!("{url}_{section_title}").as_bytes());

	format!("doc_{}", digest.to_hex())
}

/// Split markdown into sections at ATX headers. Content before the first
/// header is titled "Introduction"; headers stay inside their own section.
pub fn split_markdown_sections(markdown: &str) -> Vec<MarkdownChunk> {
	let mut chunks = Vec::new();
	let mut current_title = INTRO_TITLE.to_string();
	let mut current_content: Vec<&str> = Vec::new();

	for line in markdown.lines() {
		if let Some(title) = header_title(line) {
			push_chunk(&mut chunks, &current_title, &current_content);

			current_title = title.to_string();
			current_content = vec![line];
		} else {
			current_content.push(line);
		}
	}

	push_chunk(&mut chunks, &current_title, &current_content);

	chunks
}

/// Assemble documentation chunks for one page, prefixing each section with
/// its breadcrumb so the embedded text carries navigational context.
pub fn build_chunks(
	source: &str,
	breadcrumb: &str,
	url: &str,
	markdown: &str,
) -> Vec<DocumentationChunk> {
	split_markdown_sections(markdown)
		.into_iter()
		.map(|chunk| {
			let section_path = format!("{breadcrumb} > {}", chunk.title);
			let text = format!("Context: {section_path}\n\n{}", chunk.content);

			DocumentationChunk {
				id: chunk_id(url, &chunk.title),
				text,
				metadata: DocumentationMetadata {
					source: source.to_string(),
					title: chunk.title,
					url: url.to_string(),
					section_path,
					doc_type: "guide".to_string(),
					..DocumentationMetadata::default()
				},
			}
		})
		.collect()
}

fn header_title(line: &str) -> Option<&str> {
	let hashes = line.bytes().take_while(|byte| *byte == b'#').count();

	if !(1..=6).contains(&hashes) {
		return None;
	}

	let rest = &line[hashes..];

	if !rest.starts_with(char::is_whitespace) {
		return None;
	}

	let title = rest.trim();

	if title.is_empty() { None } else { Some(title) }
}

fn push_chunk(chunks: &mut Vec<MarkdownChunk>, title: &str, content: &[&str]) {
	if content.concat().trim().is_empty() {
		return;
	}

	chunks.push(MarkdownChunk {
		title: title.to_string(),
		content: content.join("\n").trim().to_string(),
	});
}
