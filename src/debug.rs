use std::{collections::VecDeque, fmt};

use crate::{AvlMap, Dir, NodeId};

impl<K: fmt::Display, V> AvlMap<K, V> {
    /// Writes the shape of the tree in [graphviz format], one rank per tree level.
    ///
    /// Nodes are labelled `key:height`; missing children are drawn as points.
    ///
    /// [graphviz format]: https://graphviz.org/doc/info/lang.html
    pub fn dotgraph<W: fmt::Write>(&self, name: &str, mut w: W) -> fmt::Result {
        let Some(root) = self.tree.root() else {
            return write!(w, "digraph \"graph-{name}\" {{}}");
        };

        enum Item {
            Node(NodeId),
            Missing(u32),
        }

        let mut queue = VecDeque::new();
        queue.push_back(Item::Node(root));

        write!(
            w,
            "digraph \"graph-{name}\" {{\n subgraph \"subgraph-{name}\" {{"
        )?;

        let mut missing = 0;
        let mut links = String::new();

        while !queue.is_empty() {
            use fmt::Write;

            write!(w, "{{rank=same; ")?;

            for _ in 0..queue.len() {
                let node = match queue.pop_front() {
                    Some(Item::Node(node)) => node,
                    Some(Item::Missing(id)) => {
                        write!(w, "\"graph{name}-missing{id}\" [shape=point]; ")?;
                        continue;
                    }
                    None => break,
                };

                let key = self.tree.key(node);
                let height = self.tree.height_at(node);
                write!(w, "\"graph{name}-{key}\" [label=\"{key}:{height}\"]; ")?;

                for dir in [Dir::Left, Dir::Right] {
                    match self.tree.child(node, dir) {
                        Some(child) => {
                            let child_key = self.tree.key(child);

                            queue.push_back(Item::Node(child));
                            writeln!(
                                links,
                                "\"graph{name}-{key}\" -> \"graph{name}-{child_key}\";"
                            )?;
                        }

                        None => {
                            queue.push_back(Item::Missing(missing));
                            writeln!(
                                links,
                                "\"graph{name}-{key}\" -> \"graph{name}-missing{missing}\";"
                            )?;
                            missing += 1;
                        }
                    }
                }
            }

            writeln!(w, "}}")?;
        }

        w.write_str(&links)?;

        w.write_str(" }\n}")
    }
}

#[cfg(test)]
mod tests {
    use crate::AvlMap;

    #[test]
    fn empty() {
        let map: AvlMap<u32, ()> = AvlMap::new();
        let mut out = String::new();

        map.dotgraph("empty", &mut out).unwrap();
        assert_eq!(out, "digraph \"graph-empty\" {}");
    }

    #[test]
    fn labels_carry_heights() {
        let map: AvlMap<u32, ()> = [(1, ()), (2, ()), (3, ())].into_iter().collect();
        let mut out = String::new();

        map.dotgraph("t", &mut out).unwrap();
        assert!(out.contains("\"grapht-2\" [label=\"2:2\"]"));
        assert!(out.contains("\"grapht-1\" [label=\"1:1\"]"));
        assert!(out.contains("\"grapht-2\" -> \"grapht-3\";"));
        assert!(out.ends_with(" }\n}"));
    }
}
