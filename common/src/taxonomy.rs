//! Ind AS label taxonomy
//!
//! The classification targets form a fixed tree:
//! classification type (Balance Sheet / Profit & Loss) → line item → sub item.
//! Only leaves are valid targets. The tree is flattened once into the ordered
//! list of full label paths (`Balance Sheet > ASSETS > ... > Leaf`), which is
//! the single source of truth for what labels exist.

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::Path;

/// Separator between path segments
pub const PATH_SEPARATOR: &str = " > ";

/// One node of the taxonomy tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyNode {
    pub name: String,
    pub children: Vec<TaxonomyNode>,
}

impl TaxonomyNode {
    pub fn leaf(name: &str) -> Self {
        Self {
            name: name.to_string(),
            children: Vec::new(),
        }
    }

    pub fn branch(name: &str, children: Vec<TaxonomyNode>) -> Self {
        Self {
            name: name.to_string(),
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    fn child(&self, name: &str) -> Option<&TaxonomyNode> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// Whole taxonomy: one root per classification type, in definition order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    roots: Vec<TaxonomyNode>,
}

impl Taxonomy {
    pub fn new(roots: Vec<TaxonomyNode>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[TaxonomyNode] {
        &self.roots
    }

    /// Classification type names (root node names)
    pub fn classification_types(&self) -> Vec<&str> {
        self.roots.iter().map(|r| r.name.as_str()).collect()
    }

    /// Flatten into full leaf paths.
    ///
    /// Depth-first, in definition order. A node without children emits
    /// `parent path > name`; any other node recurses into its children.
    pub fn flatten(&self) -> Vec<String> {
        let mut options = Vec::new();
        for root in &self.roots {
            collect_paths(root, "", &mut options);
        }
        options
    }

    /// Find the node addressed by a full `A > B > C` path
    pub fn find(&self, path: &str) -> Option<&TaxonomyNode> {
        let mut segments = path.split(PATH_SEPARATOR);
        let first = segments.next()?;
        let mut node = self.roots.iter().find(|r| r.name == first)?;
        for segment in segments {
            node = node.child(segment)?;
        }
        Some(node)
    }

    /// Load a taxonomy from a JSON file (see [`Taxonomy::from_json_str`])
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Load a taxonomy from nested JSON objects.
    ///
    /// Keys are node names in order; `{}` marks a leaf.
    ///
    /// # Examples
    /// ```
    /// use indas_mapper_common::Taxonomy;
    ///
    /// let json = r#"{"Profit & Loss": {"II Other Income": {}}}"#;
    /// let taxonomy = Taxonomy::from_json_str(json).unwrap();
    /// assert_eq!(taxonomy.flatten(), vec!["Profit & Loss > II Other Income"]);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        let root = value
            .as_object()
            .ok_or_else(|| Error::Taxonomy("root must be a JSON object".into()))?;

        if root.is_empty() {
            return Err(Error::Taxonomy("no classification types defined".into()));
        }

        let mut roots = Vec::with_capacity(root.len());
        for (name, subtree) in root {
            let node = node_from_json(name, subtree)?;
            if node.is_leaf() {
                return Err(Error::Taxonomy(format!(
                    "classification type '{}' has no categories",
                    name
                )));
            }
            roots.push(node);
        }

        Ok(Self { roots })
    }

    /// Ind AS Schedule III (Division II) balance sheet and P&L line items
    pub fn ind_as() -> Self {
        use TaxonomyNode as N;

        let financial_liabilities = || {
            N::branch("(a) Financial Liabilities", vec![
                N::leaf("(i) Borrowings"),
                N::leaf("(ia) Lease liabilities"),
                N::branch("(ii) Trade Payables", vec![
                    N::leaf("(A) micro/small enterprises"),
                    N::leaf("(B) other creditors"),
                ]),
                N::leaf("(iii) Other financial liabilities"),
            ])
        };

        let balance_sheet = N::branch("Balance Sheet", vec![
            N::branch("ASSETS", vec![
                N::branch("(1) Non-current assets", vec![
                    N::leaf("(a) Property, Plant and Equipment"),
                    N::leaf("(b) Capital work-in-progress"),
                    N::leaf("(c) Investment Property"),
                    N::leaf("(d) Goodwill"),
                    N::leaf("(e) Other Intangible assets"),
                    N::leaf("(f) Intangible assets under development"),
                    N::leaf("(g) Biological Assets other than bearer plants"),
                    N::branch("(h) Financial Assets", vec![
                        N::leaf("(i) Investments"),
                        N::leaf("(ii) Trade receivables"),
                        N::leaf("(iii) Loans"),
                    ]),
                    N::leaf("(i) Deferred assets (net) tax"),
                    N::leaf("(j) Other noncurrent assets"),
                ]),
                N::branch("(2) Current assets", vec![
                    N::leaf("(a) Inventories"),
                    N::branch("(b) Financial Assets", vec![
                        N::leaf("(i) Investments"),
                        N::leaf("(ii) Trade receivables"),
                        N::leaf("(iii) Cash and cash equivalents"),
                        N::leaf("(iv) Bank balances other than(iii) above"),
                        N::leaf("(v) Loans"),
                        N::leaf("(vi) Others (to be specified)"),
                    ]),
                    N::leaf("(c) Current Tax Assets (Net)"),
                    N::leaf("(d) Other current assets"),
                ]),
            ]),
            N::branch("EQUITY", vec![
                N::leaf("(a) Equity Share capital"),
                N::leaf("(b) Other Equity"),
            ]),
            N::branch("LIABILITIES", vec![
                N::branch("(1) Non-current liabilities", vec![
                    financial_liabilities(),
                    N::leaf("(b) Provisions"),
                    N::leaf("(c) Deferred tax liabilities (Net)"),
                    N::leaf("(d) Other noncurrent liabilities"),
                ]),
                N::branch("(2) Current liabilities", vec![
                    financial_liabilities(),
                    N::leaf("(b) Other current liabilities"),
                    N::leaf("(c) Provisions"),
                    N::leaf("(d) Current Tax Liabilities (Net)"),
                ]),
            ]),
        ]);

        let profit_and_loss = N::branch("Profit & Loss", vec![
            N::leaf("I Revenue From operations"),
            N::leaf("II Other Income"),
            N::branch("IV EXPENSES", vec![
                N::leaf("(a) Cost of materials consumed"),
                N::leaf("(b) Purchases of Stock-in-Trade"),
                N::leaf("(c) Changes in inventories"),
                N::leaf("(d) Employee benefits expense"),
                N::leaf("(e) Finance costs"),
                N::leaf("(f) Depreciation and amortization"),
                N::leaf("(g) Other expenses"),
            ]),
            N::leaf("V Profit/(loss) before tax"),
            N::branch("VIII Tax expense", vec![
                N::leaf("(1) Current tax"),
                N::leaf("(2) Deferred tax"),
            ]),
            N::leaf("XI Profit (Loss) continuing operations"),
            N::leaf("XII Profit/(loss) Discontinued operations"),
        ]);

        Self::new(vec![balance_sheet, profit_and_loss])
    }
}

fn collect_paths(node: &TaxonomyNode, prefix: &str, out: &mut Vec<String>) {
    let path = if prefix.is_empty() {
        node.name.clone()
    } else {
        format!("{}{}{}", prefix, PATH_SEPARATOR, node.name)
    };

    if node.is_leaf() {
        out.push(path);
    } else {
        for child in &node.children {
            collect_paths(child, &path, out);
        }
    }
}

fn node_from_json(name: &str, value: &Value) -> Result<TaxonomyNode> {
    let children: &Map<String, Value> = value.as_object().ok_or_else(|| {
        Error::Taxonomy(format!("node '{}' must be an object ({{}} for a leaf)", name))
    })?;

    let children = children
        .iter()
        .map(|(child_name, child)| node_from_json(child_name, child))
        .collect::<Result<Vec<_>>>()?;

    Ok(TaxonomyNode {
        name: name.to_string(),
        children,
    })
}

/// The taxonomy together with its flattened label options.
///
/// Built once at startup and shared by reference; never recomputed per call.
#[derive(Debug, Clone)]
pub struct LabelCatalog {
    taxonomy: Taxonomy,
    options: Vec<String>,
    index: HashSet<String>,
}

impl LabelCatalog {
    pub fn new(taxonomy: Taxonomy) -> Self {
        let options = taxonomy.flatten();
        let index = options.iter().cloned().collect();
        Self {
            taxonomy,
            options,
            index,
        }
    }

    /// Catalog over the built-in Ind AS taxonomy
    pub fn ind_as() -> Self {
        Self::new(Taxonomy::ind_as())
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Every valid label path, in taxonomy order
    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn contains(&self, label_path: &str) -> bool {
        self.index.contains(label_path)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}
