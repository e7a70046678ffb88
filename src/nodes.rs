//! Static directory of check-host.net probe nodes
//!
//! Maps node identifiers to their location and groups them by region. The
//! table is compiled in; nodes reported by the service that are missing here
//! resolve to an "Unknown" placeholder instead of failing.

use crate::types::Region;
use serde::Serialize;

/// Location metadata for a probe node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeInfo {
    pub node_id: String,
    pub country: String,
    pub city: String,
    pub region: Region,
}

impl NodeInfo {
    /// Placeholder for identifiers absent from the directory
    pub fn unknown(node_id: &str) -> Self {
        Self {
            node_id: node_id.to_string(),
            country: "Unknown".to_string(),
            city: "Unknown".to_string(),
            region: Region::Unknown,
        }
    }
}

struct NodeEntry {
    id: &'static str,
    country: &'static str,
    city: &'static str,
    region: Region,
}

const fn node(id: &'static str, country: &'static str, city: &'static str, region: Region) -> NodeEntry {
    NodeEntry { id, country, city, region }
}

// Ordered by region (EU, AS, NA, SA, EU-EAST), then as the service lists them.
const NODE_TABLE: &[NodeEntry] = &[
    node("bg1.node.check-host.net", "Bulgaria", "Sofia", Region::Eu),
    node("ch1.node.check-host.net", "Switzerland", "Zurich", Region::Eu),
    node("cz1.node.check-host.net", "Czechia", "C.Budejovice", Region::Eu),
    node("de1.node.check-host.net", "Germany", "Nuremberg", Region::Eu),
    node("de4.node.check-host.net", "Germany", "Frankfurt", Region::Eu),
    node("es1.node.check-host.net", "Spain", "Barcelona", Region::Eu),
    node("fi1.node.check-host.net", "Finland", "Helsinki", Region::Eu),
    node("fr1.node.check-host.net", "France", "Roubaix", Region::Eu),
    node("fr2.node.check-host.net", "France", "Paris", Region::Eu),
    node("hu1.node.check-host.net", "Hungary", "Nyiregyhaza", Region::Eu),
    node("it2.node.check-host.net", "Italy", "Milan", Region::Eu),
    node("lt1.node.check-host.net", "Lithuania", "Vilnius", Region::Eu),
    node("md1.node.check-host.net", "Moldova", "Chisinau", Region::Eu),
    node("nl1.node.check-host.net", "Netherlands", "Amsterdam", Region::Eu),
    node("nl2.node.check-host.net", "Netherlands", "Meppel", Region::Eu),
    node("pl1.node.check-host.net", "Poland", "Poznan", Region::Eu),
    node("pl2.node.check-host.net", "Poland", "Warsaw", Region::Eu),
    node("pt1.node.check-host.net", "Portugal", "Viana", Region::Eu),
    node("rs1.node.check-host.net", "Serbia", "Belgrade", Region::Eu),
    node("se1.node.check-host.net", "Sweden", "Tallberg", Region::Eu),
    node("uk1.node.check-host.net", "UK", "Coventry", Region::Eu),
    node("hk1.node.check-host.net", "Hong Kong", "Hong Kong", Region::As),
    node("id2.node.check-host.net", "Indonesia", "Jakarta", Region::As),
    node("il1.node.check-host.net", "Israel", "Tel Aviv", Region::As),
    node("il2.node.check-host.net", "Israel", "Netanya", Region::As),
    node("in1.node.check-host.net", "India", "Mumbai", Region::As),
    node("in2.node.check-host.net", "India", "Chennai", Region::As),
    node("ir1.node.check-host.net", "Iran", "Tehran", Region::As),
    node("ir3.node.check-host.net", "Iran", "Mashhad", Region::As),
    node("ir5.node.check-host.net", "Iran", "Esfahan", Region::As),
    node("ir6.node.check-host.net", "Iran", "Karaj", Region::As),
    node("jp1.node.check-host.net", "Japan", "Tokyo", Region::As),
    node("kz1.node.check-host.net", "Kazakhstan", "Karaganda", Region::As),
    node("tr1.node.check-host.net", "Turkey", "Istanbul", Region::As),
    node("tr2.node.check-host.net", "Turkey", "Gebze", Region::As),
    node("vn1.node.check-host.net", "Vietnam", "Ho Chi Minh City", Region::As),
    node("us1.node.check-host.net", "USA", "Los Angeles", Region::Na),
    node("us2.node.check-host.net", "USA", "Dallas", Region::Na),
    node("us3.node.check-host.net", "USA", "Atlanta", Region::Na),
    node("br1.node.check-host.net", "Brazil", "Sao Paulo", Region::Sa),
    node("ru1.node.check-host.net", "Russia", "Moscow", Region::EuEast),
    node("ru2.node.check-host.net", "Russia", "Moscow", Region::EuEast),
    node("ru3.node.check-host.net", "Russia", "Saint Petersburg", Region::EuEast),
    node("ru4.node.check-host.net", "Russia", "Ekaterinburg", Region::EuEast),
    node("ua1.node.check-host.net", "Ukraine", "Khmelnytskyi", Region::EuEast),
    node("ua2.node.check-host.net", "Ukraine", "Kyiv", Region::EuEast),
    node("ua3.node.check-host.net", "Ukraine", "SpaceX Starlink", Region::EuEast),
];

/// Result of resolving a node-set selector
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSelection {
    /// Normalized selector label (e.g. "EU+NA", "ALL")
    pub label: String,
    /// Selected node identifiers, no duplicates
    pub nodes: Vec<String>,
    /// Set when the selector was not recognized and all nodes were used
    pub warning: Option<String>,
}

/// Read-only lookup over the compiled node table
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeDirectory;

impl NodeDirectory {
    pub fn new() -> Self {
        Self
    }

    /// Location of a node; unknown identifiers get a placeholder
    pub fn lookup(&self, node_id: &str) -> NodeInfo {
        NODE_TABLE
            .iter()
            .find(|entry| entry.id == node_id)
            .map(|entry| NodeInfo {
                node_id: entry.id.to_string(),
                country: entry.country.to_string(),
                city: entry.city.to_string(),
                region: entry.region,
            })
            .unwrap_or_else(|| NodeInfo::unknown(node_id))
    }

    /// Whether the identifier is in the directory
    pub fn contains(&self, node_id: &str) -> bool {
        NODE_TABLE.iter().any(|entry| entry.id == node_id)
    }

    /// Region of a node, `Region::Unknown` when absent
    pub fn region_of(&self, node_id: &str) -> Region {
        NODE_TABLE
            .iter()
            .find(|entry| entry.id == node_id)
            .map(|entry| entry.region)
            .unwrap_or(Region::Unknown)
    }

    /// Member nodes of a region in directory order
    pub fn region_members(&self, region: Region) -> Vec<String> {
        NODE_TABLE
            .iter()
            .filter(|entry| entry.region == region)
            .map(|entry| entry.id.to_string())
            .collect()
    }

    /// Every node in directory order
    pub fn all_nodes(&self) -> Vec<String> {
        NODE_TABLE.iter().map(|entry| entry.id.to_string()).collect()
    }

    /// Number of nodes in the directory
    pub fn len(&self) -> usize {
        NODE_TABLE.len()
    }

    pub fn is_empty(&self) -> bool {
        NODE_TABLE.is_empty()
    }

    /// Resolve a selector: "ALL", a region tag, or "EU+NA".
    ///
    /// Unknown selectors fall back to every node and carry a warning.
    pub fn select(&self, selector: &str) -> NodeSelection {
        let normalized = selector.trim().to_uppercase();

        if normalized.is_empty() || normalized == "ALL" {
            return NodeSelection {
                label: "ALL".to_string(),
                nodes: self.all_nodes(),
                warning: None,
            };
        }

        if let Some(region) = Region::from_tag(&normalized) {
            return NodeSelection {
                label: region.as_str().to_string(),
                nodes: self.region_members(region),
                warning: None,
            };
        }

        if normalized == "EU+NA" {
            let mut nodes = self.region_members(Region::Eu);
            for id in self.region_members(Region::Na) {
                if !nodes.contains(&id) {
                    nodes.push(id);
                }
            }
            return NodeSelection {
                label: normalized,
                nodes,
                warning: None,
            };
        }

        NodeSelection {
            label: "ALL".to_string(),
            nodes: self.all_nodes(),
            warning: Some(format!("Unknown node selection '{}'. Using all nodes.", selector.trim())),
        }
    }

    /// Selector options offered by the interactive prompt
    pub fn selector_options(&self) -> Vec<(&'static str, &'static str)> {
        let mut options = vec![("ALL", "All available nodes")];
        for region in Region::ALL.iter().filter(|r| **r != Region::Unknown) {
            options.push((region.as_str(), region.description()));
        }
        options.push(("EU+NA", "European and North American nodes"));
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_lookup_known_node() {
        let directory = NodeDirectory::new();
        let info = directory.lookup("de4.node.check-host.net");
        assert_eq!(info.country, "Germany");
        assert_eq!(info.city, "Frankfurt");
        assert_eq!(info.region, Region::Eu);
    }

    #[test]
    fn test_lookup_unknown_node_never_fails() {
        let directory = NodeDirectory::new();
        let info = directory.lookup("zz9.node.check-host.net");
        assert_eq!(info.country, "Unknown");
        assert_eq!(info.city, "Unknown");
        assert_eq!(info.region, Region::Unknown);
        assert_eq!(directory.region_of("zz9.node.check-host.net"), Region::Unknown);
        assert!(!directory.contains("zz9.node.check-host.net"));
    }

    #[test]
    fn test_table_has_unique_ids() {
        let directory = NodeDirectory::new();
        let ids: HashSet<String> = directory.all_nodes().into_iter().collect();
        assert_eq!(ids.len(), directory.len());
    }

    #[test]
    fn test_region_members() {
        let directory = NodeDirectory::new();
        assert_eq!(directory.region_members(Region::Na).len(), 3);
        assert_eq!(directory.region_members(Region::Sa), vec!["br1.node.check-host.net".to_string()]);
        assert_eq!(directory.region_members(Region::EuEast).len(), 7);
        assert!(directory.region_members(Region::Unknown).is_empty());
    }

    #[test]
    fn test_select_all() {
        let directory = NodeDirectory::new();
        let selection = directory.select("all");
        assert_eq!(selection.label, "ALL");
        assert_eq!(selection.nodes.len(), directory.len());
        assert!(selection.warning.is_none());
    }

    #[test]
    fn test_select_region() {
        let directory = NodeDirectory::new();
        let selection = directory.select("eu-east");
        assert_eq!(selection.label, "EU-EAST");
        assert!(selection.nodes.iter().all(|id| directory.region_of(id) == Region::EuEast));
    }

    #[test]
    fn test_select_eu_plus_na() {
        let directory = NodeDirectory::new();
        let selection = directory.select("EU+NA");

        let mut expected = directory.region_members(Region::Eu);
        expected.extend(directory.region_members(Region::Na));

        assert_eq!(selection.nodes, expected);
        let unique: HashSet<&String> = selection.nodes.iter().collect();
        assert_eq!(unique.len(), selection.nodes.len());
        assert!(selection.warning.is_none());
    }

    #[test]
    fn test_select_unknown_falls_back_to_all() {
        let directory = NodeDirectory::new();
        let selection = directory.select("XX");
        assert_eq!(selection.nodes, directory.all_nodes());
        let warning = selection.warning.expect("unknown selector should warn");
        assert!(warning.contains("XX"));
    }

    #[test]
    fn test_selector_options_cover_regions() {
        let options = NodeDirectory::new().selector_options();
        let labels: Vec<&str> = options.iter().map(|(label, _)| *label).collect();
        assert!(labels.contains(&"ALL"));
        assert!(labels.contains(&"EU-EAST"));
        assert!(labels.contains(&"EU+NA"));
        assert!(!labels.contains(&"UNKNOWN"));
    }
}
