//! Category-code tree walkers.
//!
//! The API exposes two category systems that look similar but are not the
//! same encoding: the hierarchical `lclsSystm` classification served by
//! `lclsSystmCode2`, and the legacy flat `cat1/cat2/cat3` codes served by
//! `categoryCode2`. Both are 3 levels deep and both share an endpoint quirk:
//! asking for the children of a node that has none can echo the node's own
//! code back as its single "child". The walkers here keep the two systems
//! strictly apart and filter the self-echo.

use crate::client::ApiClient;
use crate::pagination;
use crate::xml::Item;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};

/// One node of the 3-level classification tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryNode {
    pub code: String,
    pub name: String,
    /// 1, 2 or 3.
    pub level: u8,
    pub parent_code: Option<String>,
}

/// A (possibly partial) path through the classification tree, used to filter
/// the listing endpoint and to name per-category dump files.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPath {
    pub l1_code: String,
    pub l1_name: String,
    pub l2_code: Option<String>,
    pub l2_name: Option<String>,
    pub l3_code: Option<String>,
    pub l3_name: Option<String>,
}

impl CategoryPath {
    pub fn top(l1: &CategoryNode) -> Self {
        Self {
            l1_code: l1.code.clone(),
            l1_name: l1.name.clone(),
            l2_code: None,
            l2_name: None,
            l3_code: None,
            l3_name: None,
        }
    }

    pub fn mid(l1: &CategoryNode, l2: &CategoryNode) -> Self {
        let mut path = Self::top(l1);
        path.l2_code = Some(l2.code.clone());
        path.l2_name = Some(l2.name.clone());
        path
    }

    pub fn leaf(l1: &CategoryNode, l2: &CategoryNode, l3: &CategoryNode) -> Self {
        let mut path = Self::mid(l1, l2);
        path.l3_code = Some(l3.code.clone());
        path.l3_name = Some(l3.name.clone());
        path
    }

    /// Composite display name for file naming: level names joined with `_`,
    /// skipping a level whose name repeats the one already appended.
    pub fn display_name(&self) -> String {
        let mut parts: Vec<&str> = vec![&self.l1_name];
        for name in [self.l2_name.as_deref(), self.l3_name.as_deref()]
            .into_iter()
            .flatten()
        {
            if parts.last() != Some(&name) {
                parts.push(name);
            }
        }
        parts.join("_")
    }
}

/// The walked classification tree plus its level indexes.
#[derive(Debug, Default)]
pub struct TaxonomyTree {
    pub level1: Vec<CategoryNode>,
    /// level-1 code → its level-2 children.
    pub level2: HashMap<String, Vec<CategoryNode>>,
    /// (level-1 code, level-2 code) → level-3 children.
    pub level3: HashMap<(String, String), Vec<CategoryNode>>,
}

impl TaxonomyTree {
    pub fn node_count(&self) -> usize {
        self.level1.len()
            + self.level2.values().map(Vec::len).sum::<usize>()
            + self.level3.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.level1.is_empty()
    }

    pub fn children_of_l1(&self, l1_code: &str) -> &[CategoryNode] {
        self.level2.get(l1_code).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn children_of_l2(&self, l1_code: &str, l2_code: &str) -> &[CategoryNode] {
        self.level3
            .get(&(l1_code.to_string(), l2_code.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Enumerate the deepest available path under every branch, capped at
    /// `max_depth` (1..=3). A branch without children at the next level
    /// contributes its partial path.
    pub fn paths(&self, max_depth: u8) -> Vec<CategoryPath> {
        let mut paths = Vec::new();
        for l1 in &self.level1 {
            let mids = self.children_of_l1(&l1.code);
            if max_depth <= 1 || mids.is_empty() {
                paths.push(CategoryPath::top(l1));
                continue;
            }
            for l2 in mids {
                let leaves = self.children_of_l2(&l1.code, &l2.code);
                if max_depth <= 2 || leaves.is_empty() {
                    paths.push(CategoryPath::mid(l1, l2));
                    continue;
                }
                for l3 in leaves {
                    paths.push(CategoryPath::leaf(l1, l2, l3));
                }
            }
        }
        paths
    }
}

/// One row of the legacy flat category scheme. Partial rows (empty `cat2` or
/// `cat3`) are real entries, matching how the upstream lists them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlatCategory {
    pub cat1: String,
    pub cat1_name: String,
    pub cat2: String,
    pub cat2_name: String,
    pub cat3: String,
    pub cat3_name: String,
}

fn nodes_from_items(items: &[Item], level: u8, parent_code: Option<&str>) -> Vec<CategoryNode> {
    items
        .iter()
        .filter_map(|item| {
            let code = item.text_or_empty("code");
            if code.is_empty() {
                return None;
            }
            // Childless nodes get echoed back as their own child.
            if Some(code.as_str()) == parent_code {
                return None;
            }
            Some(CategoryNode {
                code,
                name: item.text_or_empty("name"),
                level,
                parent_code: parent_code.map(str::to_string),
            })
        })
        .collect()
}

/// Walk the hierarchical `lclsSystm` classification: level 1 unfiltered,
/// level 2 per level-1 code, level 3 per (level-1, level-2) pair.
///
/// A failing branch shows up as zero children for that branch and the walk
/// continues with its siblings; only a failure at level 1 yields an empty
/// tree.
pub async fn walk_taxonomy(client: &ApiClient) -> TaxonomyTree {
    let mut tree = TaxonomyTree::default();

    let roots = pagination::fetch_all(client, "lclsSystmCode2", &[]).await;
    tree.level1 = nodes_from_items(&roots, 1, None);
    if tree.level1.is_empty() {
        warn!("taxonomy walk returned no level-1 codes");
        return tree;
    }
    info!("taxonomy: {} level-1 codes", tree.level1.len());

    let level1 = tree.level1.clone();
    for l1 in &level1 {
        let rows = pagination::fetch_all(
            client,
            "lclsSystmCode2",
            &[("lclsSystm1", l1.code.clone())],
        )
        .await;
        let mids = nodes_from_items(&rows, 2, Some(&l1.code));

        for l2 in &mids {
            let rows = pagination::fetch_all(
                client,
                "lclsSystmCode2",
                &[
                    ("lclsSystm1", l1.code.clone()),
                    ("lclsSystm2", l2.code.clone()),
                ],
            )
            .await;
            let leaves = nodes_from_items(&rows, 3, Some(&l2.code));
            tree.level3
                .insert((l1.code.clone(), l2.code.clone()), leaves);
        }

        tree.level2.insert(l1.code.clone(), mids);
    }

    info!("taxonomy walk complete: {} nodes", tree.node_count());
    tree
}

/// Walk the flat `cat1/cat2/cat3` scheme via `categoryCode2`, in listing
/// order: all top rows first, then the mid rows, then the leaf rows.
pub async fn walk_flat_categories(client: &ApiClient) -> Vec<FlatCategory> {
    let tops: Vec<FlatCategory> =
        nodes_from_items(&pagination::fetch_all(client, "categoryCode2", &[]).await, 1, None)
            .into_iter()
            .map(|node| FlatCategory {
                cat1: node.code,
                cat1_name: node.name,
                ..FlatCategory::default()
            })
            .collect();
    if tops.is_empty() {
        warn!("flat category walk returned no cat1 codes");
        return tops;
    }

    let mut mids = Vec::new();
    for top in &tops {
        let rows =
            pagination::fetch_all(client, "categoryCode2", &[("cat1", top.cat1.clone())]).await;
        for node in nodes_from_items(&rows, 2, Some(&top.cat1)) {
            mids.push(FlatCategory {
                cat2: node.code,
                cat2_name: node.name,
                ..top.clone()
            });
        }
    }

    let mut leaves = Vec::new();
    for mid in &mids {
        let rows = pagination::fetch_all(
            client,
            "categoryCode2",
            &[("cat1", mid.cat1.clone()), ("cat2", mid.cat2.clone())],
        )
        .await;
        for node in nodes_from_items(&rows, 3, Some(&mid.cat2)) {
            leaves.push(FlatCategory {
                cat3: node.code,
                cat3_name: node.name,
                ..mid.clone()
            });
        }
    }

    let mut all = tops;
    all.extend(mids);
    all.extend(leaves);
    info!("flat category walk complete: {} rows", all.len());
    all
}
