//! Administrative-geography containment for structured data.
//!
//! Builds `City → [City] → AdministrativeArea → [AdministrativeArea] → Country`
//! chains, eliding levels whose canonical names coincide. Pure functions only.

use crate::domain::model::{AdministrativeArea, Location, ResolvedLocation};
use crate::domain::render::{GeoKind, GeoNode};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

pub const COUNTRY_NAME: &str = "España";
pub const COUNTRY_REF: &str = "https://www.wikidata.org/wiki/Q29";

/// 比較前去掉的行政前綴 (已去重音、小寫)；長的放前面
const ADMINISTRATIVE_PREFIXES: &[&str] = &[
    "comunidad autonoma de la ",
    "comunidad autonoma del ",
    "comunidad autonoma de ",
    "comunitat autonoma de ",
    "ciudad autonoma de ",
    "comunidad foral de ",
    "comunidad de ",
    "comunitat de ",
    "provincia de la ",
    "provincia del ",
    "provincia de ",
    "principado de ",
    "region de ",
];

/// 小寫、去變音符號、合併空白並去掉行政前綴
pub fn canonicalize(name: &str) -> String {
    let folded: String = name
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();
    let collapsed = folded.split_whitespace().collect::<Vec<_>>().join(" ");

    // 官方名稱可能疊了好幾層前綴，例如 "comunidad autonoma de la region de murcia"
    let mut name = collapsed.as_str();
    loop {
        let current = name;
        match ADMINISTRATIVE_PREFIXES
            .iter()
            .find_map(move |prefix| current.strip_prefix(prefix).filter(|rest| !rest.is_empty()))
        {
            Some(rest) => name = rest,
            None => break,
        }
    }
    name.to_string()
}

pub fn same_place(a: &str, b: &str) -> bool {
    canonicalize(a) == canonicalize(b)
}

pub fn country_node() -> GeoNode {
    GeoNode {
        external_ref: Some(COUNTRY_REF.to_string()),
        ..GeoNode::new(GeoKind::Country, COUNTRY_NAME)
    }
}

fn area_node(area: &AdministrativeArea) -> GeoNode {
    GeoNode {
        geo: area.geo,
        external_ref: area.external_ref.clone(),
        ..GeoNode::new(GeoKind::AdministrativeArea, area.name.clone())
    }
}

fn place_node(location: &Location, kind: GeoKind) -> GeoNode {
    GeoNode {
        geo: location.geo,
        external_ref: location.external_ref.clone(),
        ..GeoNode::new(kind, location.name.clone())
    }
}

/// 行政層級由內而外，省與自治區同名時只保留自治區
fn administrative_levels<'a>(
    province: Option<&'a AdministrativeArea>,
    community: Option<&'a AdministrativeArea>,
) -> Vec<&'a AdministrativeArea> {
    match (province, community) {
        (Some(p), Some(c)) if same_place(&p.name, &c.name) => vec![c],
        (Some(p), Some(c)) => vec![p, c],
        (Some(p), None) => vec![p],
        (None, Some(c)) => vec![c],
        (None, None) => vec![],
    }
}

/// 由外而內把節點串起來
fn nest(mut nodes: Vec<GeoNode>) -> GeoNode {
    let mut container = country_node();
    while let Some(node) = nodes.pop() {
        container = node.within(container);
    }
    container
}

/// 建立地點的包含階層，回傳最內層節點。參照缺漏時退化為較短的鏈，不會失敗
pub fn build_hierarchy(location: &ResolvedLocation) -> GeoNode {
    let levels = administrative_levels(location.effective_province(), location.effective_community());

    // 地點本身就是某個行政區 (例如 Madrid)：以地點取代該層級
    if let Some(pos) = levels
        .iter()
        .position(|area| same_place(location.name(), &area.name))
    {
        let mut nodes = vec![place_node(&location.location, GeoKind::AdministrativeArea)];
        nodes.extend(levels[pos + 1..].iter().map(|area| area_node(area)));
        return nest(nodes);
    }

    let mut nodes = vec![place_node(&location.location, GeoKind::City)];
    if let Some(parent) = &location.parent {
        let parent_is_administrative = levels
            .iter()
            .any(|area| same_place(parent.name(), &area.name));
        if !parent_is_administrative && !same_place(parent.name(), location.name()) {
            nodes.push(place_node(&parent.location, GeoKind::City));
        }
    }
    nodes.extend(levels.iter().map(|area| area_node(area)));
    nest(nodes)
}
