use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};

use sema_protocol::OntologySource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OntoRelation {
    /// Child class to parent class.
    Hypernym,
    /// Named individual to its class.
    InstanceOf,
}

#[derive(Debug)]
struct OntoNode {
    name: String,
    /// Primary name plus synonym ring.
    labels: BTreeSet<String>,
    is_individual: bool,
}

/// One ontology relation result: the set of term strings a query term
/// matches through this node, the signed hypernym-tree distance
/// (positive = the queried term is a hypernym of the match) and
/// whether the matched node denotes a named individual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OntologyEntry {
    pub reprs: BTreeSet<String>,
    pub depth: i32,
    pub is_individual: bool,
}

/// Hypernym/hyponym/synonym graph over class and individual terms.
/// Immutable after construction; multiple sources merge by uniting
/// class hierarchies (a later source extends, never overrides).
///
/// In the default direction a query matches its synonyms, hyponyms and
/// individuals only; symmetric mode additionally grants hyponym ->
/// hypernym matches with negated depth.
pub struct Ontology {
    graph: Graph<OntoNode, OntoRelation, Directed>,
    by_label: HashMap<String, Vec<NodeIndex>>,
    by_name: HashMap<String, Vec<NodeIndex>>,
    multiwords: HashSet<String>,
    symmetric: bool,
}

fn normalize(term: &str) -> String {
    term.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl Ontology {
    pub fn new(symmetric: bool) -> Self {
        Ontology {
            graph: Graph::new(),
            by_label: HashMap::new(),
            by_name: HashMap::new(),
            multiwords: HashSet::new(),
            symmetric,
        }
    }

    pub fn from_sources(sources: &[&OntologySource], symmetric: bool) -> Self {
        let mut ontology = Ontology::new(symmetric);
        for source in sources {
            ontology.add_source(source);
        }
        ontology
    }

    pub fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    fn register_label(&mut self, label: &str, node: NodeIndex) {
        self.by_label.entry(label.to_owned()).or_default().push(node);
        if label.contains(' ') {
            self.multiwords.insert(label.to_owned());
        }
    }

    fn new_class_node(&mut self, name: &str) -> NodeIndex {
        let mut labels = BTreeSet::new();
        labels.insert(name.to_owned());
        let idx = self.graph.add_node(OntoNode {
            name: name.to_owned(),
            labels,
            is_individual: false,
        });
        self.by_name.entry(name.to_owned()).or_default().push(idx);
        self.register_label(name, idx);
        idx
    }

    /// Merges one source definition into the graph. Classes already
    /// known from earlier sources are extended in place; homonymous
    /// definitions within one source create distinct sense nodes.
    pub fn add_source(&mut self, source: &OntologySource) {
        let pre_existing: HashMap<String, NodeIndex> = self
            .by_name
            .iter()
            .filter_map(|(name, nodes)| nodes.first().map(|n| (name.clone(), *n)))
            .collect();
        let mut in_source: HashMap<String, NodeIndex> = HashMap::new();
        let mut placeholders: HashMap<String, NodeIndex> = HashMap::new();

        for def in &source.classes {
            let name = normalize(&def.name);
            let node = if let Some(&placeholder) = placeholders.get(&name) {
                placeholders.remove(&name);
                in_source.entry(name.clone()).or_insert(placeholder);
                placeholder
            } else if let Some(&existing) = pre_existing.get(&name) {
                in_source.entry(name.clone()).or_insert(existing);
                existing
            } else {
                // A repeated explicit definition in one source is a
                // homonym: it gets its own sense node.
                let idx = self.new_class_node(&name);
                in_source.entry(name.clone()).or_insert(idx);
                idx
            };

            for synonym in &def.synonyms {
                let label = normalize(synonym);
                if self.graph[node].labels.insert(label.clone()) {
                    self.register_label(&label, node);
                }
            }

            if let Some(parent) = &def.parent {
                let parent_name = normalize(parent);
                let parent_node = in_source
                    .get(&parent_name)
                    .or_else(|| placeholders.get(&parent_name))
                    .or_else(|| pre_existing.get(&parent_name))
                    .copied()
                    .unwrap_or_else(|| {
                        let idx = self.new_class_node(&parent_name);
                        placeholders.insert(parent_name.clone(), idx);
                        idx
                    });
                if !self.has_edge(node, parent_node, OntoRelation::Hypernym) {
                    self.graph.add_edge(node, parent_node, OntoRelation::Hypernym);
                }
            }

            for individual in &def.individuals {
                let label = normalize(individual);
                let known = self
                    .by_name
                    .get(&label)
                    .and_then(|nodes| {
                        nodes
                            .iter()
                            .find(|n| self.graph[**n].is_individual)
                            .copied()
                    });
                let ind_node = known.unwrap_or_else(|| {
                    let mut labels = BTreeSet::new();
                    labels.insert(label.clone());
                    let idx = self.graph.add_node(OntoNode {
                        name: label.clone(),
                        labels,
                        is_individual: true,
                    });
                    self.by_name.entry(label.clone()).or_default().push(idx);
                    self.register_label(&label, idx);
                    idx
                });
                if !self.has_edge(ind_node, node, OntoRelation::InstanceOf) {
                    self.graph.add_edge(ind_node, node, OntoRelation::InstanceOf);
                }
            }
        }
    }

    fn has_edge(&self, from: NodeIndex, to: NodeIndex, relation: OntoRelation) -> bool {
        self.graph
            .edges_directed(from, Direction::Outgoing)
            .any(|e| e.target() == to && *e.weight() == relation)
    }

    pub fn contains_multiword(&self, term: &str) -> bool {
        self.multiwords.contains(&normalize(term))
    }

    /// BFS over the given direction; outgoing edges point from child
    /// to parent, so `Incoming` walks hyponyms and `Outgoing` walks
    /// hypernyms.
    fn walk(&self, start: NodeIndex, direction: Direction) -> Vec<(NodeIndex, i32)> {
        let mut seen: HashSet<NodeIndex> = HashSet::from([start]);
        let mut queue: VecDeque<(NodeIndex, i32)> = VecDeque::from([(start, 0)]);
        let mut result = Vec::new();
        while let Some((node, depth)) = queue.pop_front() {
            for edge in self.graph.edges_directed(node, direction) {
                let next = match direction {
                    Direction::Incoming => edge.source(),
                    Direction::Outgoing => edge.target(),
                };
                if seen.insert(next) {
                    result.push((next, depth + 1));
                    queue.push_back((next, depth + 1));
                }
            }
        }
        result
    }

    /// All entries related to `term`: synonyms always, hyponyms and
    /// individuals in the default direction, hypernyms additionally
    /// (with negated depth) in symmetric mode. The term itself never
    /// appears in any entry.
    pub fn get_matching_entries(&self, term: &str) -> Vec<OntologyEntry> {
        let norm = normalize(term);
        let Some(nodes) = self.by_label.get(&norm) else {
            return Vec::new();
        };
        let mut entries = Vec::new();
        for &node in nodes {
            let own: BTreeSet<String> = self.graph[node]
                .labels
                .iter()
                .filter(|l| **l != norm)
                .cloned()
                .collect();
            if !own.is_empty() {
                entries.push(OntologyEntry {
                    reprs: own,
                    depth: 0,
                    is_individual: self.graph[node].is_individual,
                });
            }
            for (descendant, depth) in self.walk(node, Direction::Incoming) {
                let reprs: BTreeSet<String> = self.graph[descendant]
                    .labels
                    .iter()
                    .filter(|l| **l != norm)
                    .cloned()
                    .collect();
                if !reprs.is_empty() {
                    entries.push(OntologyEntry {
                        reprs,
                        depth,
                        is_individual: self.graph[descendant].is_individual,
                    });
                }
            }
            if self.symmetric {
                for (ancestor, depth) in self.walk(node, Direction::Outgoing) {
                    let reprs: BTreeSet<String> = self.graph[ancestor]
                        .labels
                        .iter()
                        .filter(|l| **l != norm)
                        .cloned()
                        .collect();
                    if !reprs.is_empty() {
                        entries.push(OntologyEntry {
                            reprs,
                            depth: -depth,
                            is_individual: self.graph[ancestor].is_individual,
                        });
                    }
                }
            }
        }
        entries
    }

    /// Union of all matching entry representations; the test channel
    /// of choice for relation coverage.
    pub fn get_words_matching(&self, term: &str) -> BTreeSet<String> {
        self.get_matching_entries(term)
            .into_iter()
            .flat_map(|e| e.reprs)
            .collect()
    }

    /// The best entry under which any of `candidates` matches
    /// `query_term`: smallest absolute depth wins, direct synonymy
    /// beats hypernymy at equal distance. `None` when nothing matches
    /// or the only match would be the term itself.
    pub fn matches(&self, query_term: &str, candidates: &[&str]) -> Option<OntologyEntry> {
        let norm_query = normalize(query_term);
        let normalized: Vec<String> = candidates
            .iter()
            .map(|c| normalize(c))
            .filter(|c| *c != norm_query)
            .collect();
        if normalized.is_empty() {
            return None;
        }
        self.get_matching_entries(query_term)
            .into_iter()
            .filter(|entry| normalized.iter().any(|c| entry.reprs.contains(c)))
            .min_by_key(|entry| (entry.depth.abs(), (entry.depth < 0) as u8))
    }

    /// Walks the hypernym chain upward to the class with no further
    /// hypernym. Identity for unknown terms; individuals resolve
    /// through their class. At a homonym fork the alphabetically first
    /// maximal ancestor is chosen, so the result is deterministic.
    pub fn get_most_general_hypernym_ancestor(&self, term: &str) -> String {
        let norm = normalize(term);
        let Some(nodes) = self.by_label.get(&norm) else {
            return norm;
        };
        let mut tops: BTreeSet<String> = BTreeSet::new();
        for &node in nodes {
            let ancestors = self.walk(node, Direction::Outgoing);
            if ancestors.is_empty() {
                if !self.graph[node].is_individual {
                    tops.insert(self.graph[node].name.clone());
                }
                continue;
            }
            for (ancestor, _) in ancestors {
                let no_parents = self
                    .graph
                    .edges_directed(ancestor, Direction::Outgoing)
                    .next()
                    .is_none();
                if no_parents {
                    tops.insert(self.graph[ancestor].name.clone());
                }
            }
        }
        tops.into_iter().next().unwrap_or(norm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sema_protocol::OntologyClassDef;

    fn class(name: &str, parent: Option<&str>) -> OntologyClassDef {
        OntologyClassDef {
            name: name.into(),
            parent: parent.map(str::to_owned),
            synonyms: vec![],
            individuals: vec![],
        }
    }

    fn class_full(
        name: &str,
        parent: Option<&str>,
        synonyms: &[&str],
        individuals: &[&str],
    ) -> OntologyClassDef {
        OntologyClassDef {
            name: name.into(),
            parent: parent.map(str::to_owned),
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
            individuals: individuals.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Mirrors the hierarchy the engine is routinely exercised with:
    /// an animal subtree, a homonymous "horse" under equipment, and an
    /// unrelated leaf class.
    fn base_source() -> OntologySource {
        OntologySource {
            version: 1,
            classes: vec![
                class("animal", None),
                class_full("dog", Some("animal"), &["hound"], &["Fido"]),
                class("german shepherd dog", Some("dog")),
                class("puppy", Some("dog")),
                class_full(
                    "cat",
                    Some("animal"),
                    &["pussy", "cat creature"],
                    &["Mimi Momo"],
                ),
                class("kitten", Some("cat")),
                class("horse", Some("animal")),
                class("foal", Some("horse")),
                class("gymnastics equipment", None),
                class_full("horse", Some("gymnastics equipment"), &["vaulting horse"], &[]),
                class("football", None),
            ],
        }
    }

    fn extension_source() -> OntologySource {
        OntologySource {
            version: 1,
            classes: vec![
                class("poodle", Some("dog")),
                class_full("cat", None, &[], &["Schneeglöckchen"]),
                class("gymnastics equipment", Some("school gear")),
            ],
        }
    }

    fn ontology() -> Ontology {
        Ontology::from_sources(&[&base_source()], false)
    }

    fn symmetric_ontology() -> Ontology {
        Ontology::from_sources(&[&base_source()], true)
    }

    fn words(o: &Ontology, term: &str) -> BTreeSet<String> {
        o.get_words_matching(term)
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_multiwords() {
        let o = ontology();
        assert!(o.contains_multiword("gymnastics equipment"));
        assert!(o.contains_multiword("German Shepherd dog"));
        assert!(o.contains_multiword("MIMI MOMO"));
        assert!(!o.contains_multiword("horse"));
        assert!(!o.contains_multiword("economic development"));
        assert!(!o.contains_multiword("Fido"));
    }

    #[test]
    fn test_word_does_not_match_itself() {
        let o = ontology();
        assert!(words(&o, "football").is_empty());
        assert!(words(&o, "fido").is_empty());
        assert!(words(&o, "mimi momo").is_empty());
        assert!(o.matches("dog", &["dog"]).is_none());
        assert!(o.matches("Mimi Momo", &["mimi momo"]).is_none());
    }

    #[test]
    fn test_word_matches_subclasses_and_synonyms() {
        let o = ontology();
        assert_eq!(
            words(&o, "dog"),
            set(&["german shepherd dog", "puppy", "hound", "fido"])
        );
        assert_eq!(
            words(&o, "cat"),
            set(&["kitten", "pussy", "mimi momo", "cat creature"])
        );
        assert_eq!(
            words(&o, "hound"),
            set(&["german shepherd dog", "puppy", "dog", "fido"])
        );
        assert_eq!(
            words(&o, "pussy"),
            set(&["kitten", "cat", "mimi momo", "cat creature"])
        );
    }

    #[test]
    fn test_matching_normal_term() {
        let o = ontology();
        let entry = o.matches("animal", &["foal"]).expect("entry");
        assert_eq!(entry.depth, 2);
        assert!(!entry.is_individual);
        assert!(o.matches("foal", &["animal"]).is_none());
    }

    #[test]
    fn test_matching_individual_term() {
        let o = ontology();
        let entry = o.matches("animal", &["mimi momo"]).expect("entry");
        assert_eq!(entry.depth, 2);
        assert!(entry.is_individual);
        assert!(o.matches("mimi momo", &["animal"]).is_none());
    }

    #[test]
    fn test_homonym_behaviour() {
        let o = ontology();
        assert_eq!(words(&o, "horse"), set(&["vaulting horse", "foal"]));
        assert_eq!(
            words(&o, "gymnastics equipment"),
            set(&["horse", "vaulting horse"])
        );
        assert_eq!(
            words(&o, "animal"),
            set(&[
                "dog",
                "cat",
                "horse",
                "german shepherd dog",
                "puppy",
                "hound",
                "kitten",
                "pussy",
                "foal",
                "fido",
                "mimi momo",
                "cat creature",
            ])
        );
        assert!(o.matches("animal", &["vaulting horse"]).is_none());
    }

    #[test]
    fn test_symmetric_adds_superclasses() {
        let o = symmetric_ontology();
        assert_eq!(
            words(&o, "dog"),
            set(&["german shepherd dog", "puppy", "hound", "fido", "animal"])
        );
        assert_eq!(
            words(&o, "mimi momo"),
            set(&["cat", "cat creature", "pussy", "animal"])
        );
        assert!(words(&o, "football").is_empty());
    }

    #[test]
    fn test_symmetric_negated_depth() {
        let o = symmetric_ontology();
        let entry = o.matches("animal", &["foal"]).expect("entry");
        assert_eq!(entry.depth, 2);
        let entry = o.matches("foal", &["animal"]).expect("entry");
        assert_eq!(entry.depth, -2);
        assert!(!entry.is_individual);
        let entry = o.matches("mimi momo", &["animal"]).expect("entry");
        assert_eq!(entry.depth, -2);
        assert!(!entry.is_individual);
    }

    #[test]
    fn test_synonym_preferred_over_hyponym() {
        let o = ontology();
        let entry = o.matches("cat", &["pussy", "kitten"]).expect("entry");
        assert_eq!(entry.depth, 0);
        assert!(entry.reprs.contains("pussy"));
    }

    #[test]
    fn test_most_general_hypernym_ancestor() {
        let o = ontology();
        assert_eq!(o.get_most_general_hypernym_ancestor("cat"), "animal");
        assert_eq!(
            o.get_most_general_hypernym_ancestor("cat creature"),
            "animal"
        );
        assert_eq!(o.get_most_general_hypernym_ancestor("fido"), "animal");
        assert_eq!(o.get_most_general_hypernym_ancestor("mimi momo"), "animal");
        assert_eq!(o.get_most_general_hypernym_ancestor("animal"), "animal");
        assert_eq!(o.get_most_general_hypernym_ancestor("toolbox"), "toolbox");
    }

    #[test]
    fn test_most_general_hypernym_ancestor_homonym_deterministic() {
        // The homonymous "horse" hangs under two roots; the choice is
        // stable across rebuilds.
        for _ in 0..20 {
            let o = ontology();
            assert_eq!(o.get_most_general_hypernym_ancestor("horse"), "animal");
        }
    }

    #[test]
    fn test_most_general_hypernym_ancestor_idempotent() {
        let o = ontology();
        let first = o.get_most_general_hypernym_ancestor("kitten");
        assert_eq!(o.get_most_general_hypernym_ancestor(&first), first);
    }

    #[test]
    fn test_combined_sources_merge_classes() {
        for sources in [
            vec![base_source(), extension_source()],
            vec![extension_source(), base_source()],
        ] {
            let refs: Vec<&OntologySource> = sources.iter().collect();
            let o = Ontology::from_sources(&refs, false);
            assert_eq!(
                words(&o, "dog"),
                set(&["german shepherd dog", "puppy", "hound", "fido", "poodle"])
            );
            assert!(words(&o, "poodle").is_empty());
            assert_eq!(o.get_most_general_hypernym_ancestor("poodle"), "animal");
            let entry = o.matches("animal", &["poodle"]).expect("entry");
            assert_eq!(entry.depth, 2);
            assert!(!entry.is_individual);
            assert!(o.matches("poodle", &["animal"]).is_none());

            assert_eq!(
                words(&o, "cat"),
                set(&[
                    "kitten",
                    "pussy",
                    "mimi momo",
                    "cat creature",
                    "schneeglöckchen",
                ])
            );
            let entry = o.matches("animal", &["schneeglöckchen"]).expect("entry");
            assert_eq!(entry.depth, 2);
            assert!(entry.is_individual);
        }
    }

    #[test]
    fn test_combined_sources_symmetric() {
        let base = base_source();
        let ext = extension_source();
        let o = Ontology::from_sources(&[&base, &ext], true);
        assert_eq!(
            words(&o, "poodle"),
            set(&["dog", "hound", "animal"])
        );
        let entry = o.matches("poodle", &["animal"]).expect("entry");
        assert_eq!(entry.depth, -2);
        // "horse" now additionally reaches the equipment hierarchy.
        assert!(words(&o, "horse").contains("school gear"));
    }
}
