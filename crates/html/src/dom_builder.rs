use crate::types::{Element, Node, Token};

/// Open elements deeper than this are flattened into their parent.
pub const MAX_DEPTH: usize = 256;

/// Elements that close an open `<p>` when they start.
fn closes_paragraph(name: &str) -> bool {
    matches!(
        name,
        "p" | "div"
            | "ul"
            | "ol"
            | "dl"
            | "pre"
            | "blockquote"
            | "table"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "section"
            | "figure"
    )
}

/// Build an element tree from tokens.
///
/// Recovery is deliberately simple: an end tag closes the nearest open
/// element with that name (and everything opened after it), unmatched end
/// tags are ignored, and whatever is still open at the end is closed.
pub fn build_dom(tokens: Vec<Token>) -> Element {
    let mut stack = vec![Element::new("#document", Vec::new())];
    let mut flattened = 0usize;

    for token in tokens {
        match token {
            Token::Text(text) => append(&mut stack, Node::Text(text)),
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                if closes_paragraph(&name) {
                    close_open(&mut stack, "p", &["div", "td", "li", "blockquote"]);
                }
                if name == "li" {
                    close_open(&mut stack, "li", &["ul", "ol"]);
                }
                let element = Element::new(name, attributes);
                if self_closing {
                    append(&mut stack, Node::Element(element));
                } else if stack.len() > MAX_DEPTH {
                    flattened += 1;
                } else {
                    stack.push(element);
                }
            }
            Token::EndTag(name) => {
                let Some(pos) = stack.iter().rposition(|e| e.name == name) else {
                    continue;
                };
                if pos == 0 {
                    continue;
                }
                while stack.len() > pos {
                    pop_into_parent(&mut stack);
                }
            }
        }
    }

    while stack.len() > 1 {
        pop_into_parent(&mut stack);
    }
    if flattened > 0 {
        log::debug!(target: "html", "flattened {flattened} element(s) past depth {MAX_DEPTH}");
    }
    stack.pop().unwrap_or_default()
}

fn append(stack: &mut [Element], node: Node) {
    if let Some(top) = stack.last_mut() {
        top.children.push(node);
    }
}

fn pop_into_parent(stack: &mut Vec<Element>) {
    if let Some(done) = stack.pop() {
        append(stack, Node::Element(done));
    }
}

/// Close the nearest open `name` unless one of `scope` is opened after it.
fn close_open(stack: &mut Vec<Element>, name: &str, scope: &[&str]) {
    let Some(pos) = stack
        .iter()
        .rposition(|e| e.name == name || scope.contains(&e.name.as_str()))
    else {
        return;
    };
    if pos == 0 || stack[pos].name != name {
        return;
    }
    while stack.len() > pos {
        pop_into_parent(stack);
    }
}
