//! XML payload to [`AnalysisResult`].
//!
//! Every element the data model needs must be present. A sentence missing its
//! tokens, parse, or dependency groups fails the whole response rather than
//! producing a partially shaped result.

use std::str::FromStr;

use roxmltree::{Document, Node};

use super::document::{
    AnalysisResult, DepNode, DependencyEdge, DependencyGroup, Entity, MachineReading, Sentence,
    Token,
};
use crate::channel::RawResponse;
use crate::error::MalformedResponse;

type Result<T> = std::result::Result<T, MalformedResponse>;

/// Parse the engine's XML response.
pub fn transcode(raw: &RawResponse) -> Result<AnalysisResult> {
    let doc = Document::parse(raw.as_str())
        .map_err(|e| MalformedResponse::new(format!("invalid XML: {e}")))?;

    let root = doc.root_element();
    if !root.has_tag_name("root") {
        return Err(MalformedResponse::new(format!(
            "unexpected root element <{}>",
            root.tag_name().name()
        )));
    }
    let document = child(root, "document", "root")?;
    let sentences = child(document, "sentences", "document")?;

    let sentences = elements(sentences, "sentence")
        .map(sentence)
        .collect::<Result<Vec<_>>>()?;

    Ok(AnalysisResult { sentences })
}

fn sentence(node: Node<'_, '_>) -> Result<Sentence> {
    let id = attribute(node, "id", "sentence")?.to_string();
    let context = format!("sentence {id}");

    let tokens = elements(child(node, "tokens", &context)?, "token")
        .map(|t| token(t, &context))
        .collect::<Result<Vec<_>>>()?;

    let parse = text(child(node, "parse", &context)?);

    let dependencies = descendants(node, "dependencies")
        .map(|d| dependency_group(d, &context))
        .collect::<Result<Vec<_>>>()?;
    if dependencies.is_empty() {
        return Err(missing("dependencies", &context));
    }

    let entities = descendants(node, "entity")
        .map(|e| entity(e, &context))
        .collect::<Result<Vec<_>>>()?;

    Ok(Sentence {
        id,
        tokens,
        parse,
        dependencies,
        machine_reading: MachineReading { entities },
    })
}

fn token(node: Node<'_, '_>, sentence: &str) -> Result<Token> {
    let id = attribute(node, "id", sentence)?.to_string();
    let context = format!("{sentence} token {id}");
    let field = |name: &str| child(node, name, &context).map(|n| text(n).trim().to_string());

    Ok(Token {
        word: field("word")?,
        lemma: field("lemma")?,
        character_offset_begin: number(
            &field("CharacterOffsetBegin")?,
            "CharacterOffsetBegin",
            &context,
        )?,
        character_offset_end: number(
            &field("CharacterOffsetEnd")?,
            "CharacterOffsetEnd",
            &context,
        )?,
        pos: field("POS")?,
        ner: field("NER")?,
        id,
    })
}

fn dependency_group(node: Node<'_, '_>, sentence: &str) -> Result<DependencyGroup> {
    let kind = attribute(node, "type", &format!("{sentence} dependencies"))?.to_string();
    let context = format!("{sentence} {kind}");
    let edges = elements(node, "dep")
        .map(|d| dependency_edge(d, &context))
        .collect::<Result<Vec<_>>>()?;
    Ok(DependencyGroup { kind, edges })
}

fn dependency_edge(node: Node<'_, '_>, group: &str) -> Result<DependencyEdge> {
    let kind = attribute(node, "type", &format!("{group} dep"))?.to_string();
    let context = format!("{group} {kind}");
    Ok(DependencyEdge {
        governor: dep_node(child(node, "governor", &context)?, &context)?,
        dependent: dep_node(child(node, "dependent", &context)?, &context)?,
        kind,
    })
}

fn dep_node(node: Node<'_, '_>, context: &str) -> Result<DepNode> {
    let context = format!("{context} {}", node.tag_name().name());
    let idx = number(attribute(node, "idx", &context)?, "idx", &context)?;
    Ok(DepNode {
        idx,
        value: text(node).trim().to_string(),
    })
}

fn entity(node: Node<'_, '_>, sentence: &str) -> Result<Entity> {
    let id = attribute(node, "id", &format!("{sentence} entity"))?.to_string();
    let context = format!("{sentence} entity {id}");
    let span = child(node, "span", &context)?;
    let span_context = format!("{context} span");
    Ok(Entity {
        val: text(node).trim().to_string(),
        start: number(attribute(span, "start", &span_context)?, "start", &span_context)?,
        end: number(attribute(span, "end", &span_context)?, "end", &span_context)?,
        id,
    })
}

fn elements<'a, 'input: 'a>(
    parent: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    parent.children().filter(move |n| n.has_tag_name(name))
}

fn descendants<'a, 'input: 'a>(
    parent: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    parent.descendants().filter(move |n| n.has_tag_name(name))
}

fn child<'a, 'input>(
    parent: Node<'a, 'input>,
    name: &str,
    context: &str,
) -> Result<Node<'a, 'input>> {
    parent
        .children()
        .find(|n| n.has_tag_name(name))
        .ok_or_else(|| missing(name, context))
}

fn attribute<'a>(node: Node<'a, '_>, name: &str, context: &str) -> Result<&'a str> {
    node.attribute(name).ok_or_else(|| {
        MalformedResponse::new(format!("{context}: missing attribute `{name}`"))
    })
}

/// All text below `node`, concatenated.
fn text(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect()
}

fn number<T: FromStr>(value: &str, name: &str, context: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        MalformedResponse::new(format!("{context}: `{name}` is not a number: {value:?}"))
    })
}

fn missing(element: &str, context: &str) -> MalformedResponse {
    MalformedResponse::new(format!("{context}: missing <{element}>"))
}
