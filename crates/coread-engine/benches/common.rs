// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use coread_engine::{Anchor, AgentId, SectionId, ThreadId, ThreadSummary, ThreadType};

#[allow(dead_code)]
pub fn generate_section_content(paragraphs: usize) -> String {
    let mut content = String::new();
    for i in 0..paragraphs {
        if i % 4 == 0 {
            content.push_str(&format!("### Subsection {i}\n"));
        }
        content.push_str(&format!(
            "Paragraph {i} observes that the sky is blue because shorter wavelengths scatter more. \
             Marker phrase number {i} closes the paragraph.\n"
        ));
    }
    content
}

/// One thread per paragraph, anchored on its marker phrase, plus every
/// fifth thread overlapping the previous one
#[allow(dead_code)]
pub fn generate_threads(paragraphs: usize) -> Vec<ThreadSummary> {
    (0..paragraphs)
        .map(|i| {
            let snippet = if i % 5 == 4 {
                format!("number {i} closes the paragraph.\nParagraph {}", i + 1)
            } else {
                format!("Marker phrase number {i} closes")
            };
            ThreadSummary {
                thread_id: ThreadId(format!("t{i}")),
                thread_type: ThreadType::Comment,
                discussion_type: None,
                tension_point: String::new(),
                participants: vec![AgentId::ALL[i % AgentId::ALL.len()]],
                message_count: 0,
                anchor: Anchor::new(SectionId::from("s1"), snippet),
            }
        })
        .collect()
}
