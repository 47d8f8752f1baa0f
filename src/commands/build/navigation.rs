use super::*;

const MKDOCS_BASE: &str = include_str!("../../../site/mkdocs_base.yml");
const NOT_IN_NAV: &str = "\n/proceedings.md\n/data.md";
const PYTHON_NAME_TAG: &str = "!!python/name:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub(super) enum NavItem {
    Page(String),
    Section(Vec<NavEntry>),
}

pub(super) type NavEntry = BTreeMap<String, NavItem>;

fn entry(label: &str, item: NavItem) -> NavEntry {
    BTreeMap::from([(label.to_string(), item)])
}

fn page_entry(label: &str, path: &Path) -> NavEntry {
    entry(label, NavItem::Page(path.to_string_lossy().replace('\\', "/")))
}

/// Home, then each edition newest first with its tracks and their pages.
pub(super) fn navigation(site: &SiteData<'_>) -> Vec<NavEntry> {
    let mut nav = vec![entry("Home", NavItem::Page("index.md".to_string()))];

    for trec in site.editions().iter().copied() {
        let mut items = vec![page_entry(
            TrackPage::Overview.label(),
            &edition_page_path(trec, TrackPage::Overview),
        )];
        if site.has_edition_proceedings(trec) {
            items.push(page_entry(
                TrackPage::Proceedings.label(),
                &edition_page_path(trec, TrackPage::Proceedings),
            ));
        }
        for track in site.tracks_of(trec) {
            items.push(entry(
                track.display_name(),
                NavItem::Section(track_navigation(site, trec, &track.track)),
            ));
        }
        nav.push(entry(&edition_label(trec), NavItem::Section(items)));
    }
    nav
}

const TRACK_NAV_ORDER: [TrackPage; 6] = [
    TrackPage::Overview,
    TrackPage::Data,
    TrackPage::Participants,
    TrackPage::Runs,
    TrackPage::Results,
    TrackPage::Proceedings,
];

fn track_navigation(site: &SiteData<'_>, trec: &str, track: &str) -> Vec<NavEntry> {
    TRACK_NAV_ORDER
        .into_iter()
        .filter(|page| page.is_available(&site.absence, trec, track))
        .map(|page| page_entry(page.label(), &track_page_path(trec, track, page)))
        .collect()
}

/// The full `mkdocs.yml`: the embedded base config plus `nav` and `not_in_nav`.
pub(super) fn mkdocs_config(site: &SiteData<'_>) -> Result<String> {
    let mut config: serde_yaml::Mapping =
        serde_yaml::from_str(MKDOCS_BASE).context("failed to parse embedded mkdocs config")?;
    let nav = serde_yaml::to_value(navigation(site)).context("failed to serialize navigation")?;
    config.insert("nav".into(), nav);
    config.insert("not_in_nav".into(), NOT_IN_NAV.into());

    let rendered = serde_yaml::to_string(&config).context("failed to render mkdocs config")?;
    // mkdocs resolves python tags only when they are unquoted.
    let mut output = String::with_capacity(rendered.len());
    for line in rendered.lines() {
        if line.contains(PYTHON_NAME_TAG) {
            output.push_str(&line.replace(['\'', '"'], ""));
        } else {
            output.push_str(line);
        }
        output.push('\n');
    }
    Ok(output)
}
