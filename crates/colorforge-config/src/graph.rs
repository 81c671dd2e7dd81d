//! The config graph builder.
//!
//! Assembly is a strict phase sequence with no back-edges: reference, look
//! synthesis, regular spaces, roles, look integration, deferred aliases,
//! displays, validation. Every phase failure aborts the whole build — a
//! partial document never escapes this module.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use colorforge_core::{Direction, TransformStep};

use crate::error::ConfigError;
use crate::look::{Look, LookPolicy, augment_with_looks};
use crate::space::{ColorSpace, Naming, sanitize_view_name};
use crate::writer::{ConfigDocument, DisplayDef, LookDef, ViewDef};

/// One view of a display, referencing a color space by its declared name.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub name: String,
    pub colorspace: String,
}

impl View {
    pub fn new(name: impl Into<String>, colorspace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            colorspace: colorspace.into(),
        }
    }
}

/// The standard role assignments. `rendering` and `compositing_linear`
/// always follow `scene_linear`.
#[derive(Debug, Clone, PartialEq)]
pub struct Roles {
    pub color_picking: String,
    pub color_timing: String,
    pub compositing_log: String,
    pub data: String,
    pub default: String,
    pub matte_paint: String,
    pub reference: String,
    pub scene_linear: String,
    pub texture_paint: String,
}

impl Roles {
    /// Role name / target pairs in declaration order.
    pub fn pairs(&self) -> [(&'static str, &str); 9] {
        [
            ("color_picking", &self.color_picking),
            ("color_timing", &self.color_timing),
            ("compositing_log", &self.compositing_log),
            ("data", &self.data),
            ("default", &self.default),
            ("matte_paint", &self.matte_paint),
            ("reference", &self.reference),
            ("scene_linear", &self.scene_linear),
            ("texture_paint", &self.texture_paint),
        ]
    }
}

/// Declarative input to the builder: everything the graph is assembled from.
#[derive(Debug, Clone)]
pub struct ConfigData {
    /// Anchor all to/from-reference chains are expressed relative to.
    pub reference: ColorSpace,
    pub colorspaces: Vec<ColorSpace>,
    pub roles: Roles,
    /// Display name → ordered views.
    pub displays: BTreeMap<String, Vec<View>>,
    pub default_display: String,
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub description: String,
    pub search_paths: Vec<String>,
    /// Emit alias color spaces for declared aliases.
    pub aliases: bool,
    pub naming: Naming,
    pub looks: Vec<Look>,
    pub look_policy: LookPolicy,
    /// Name of the merged display used when every Output Transform becomes a
    /// view of one display.
    pub single_display_name: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            description: String::new(),
            search_paths: vec!["luts".to_owned()],
            aliases: true,
            naming: Naming::FamilyPrefixed,
            looks: Vec::new(),
            look_policy: LookPolicy::SingleDisplay,
            single_display_name: "ACES".to_owned(),
        }
    }
}

/// Read-only presentation-name lookup, filled while spaces enter the graph
/// and consulted only at serialization time.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    naming: Naming,
    prefixed: BTreeMap<String, String>,
}

impl NameTable {
    fn new(naming: Naming) -> Self {
        Self {
            naming,
            prefixed: BTreeMap::new(),
        }
    }

    fn register(&mut self, space: &ColorSpace) {
        self.prefixed
            .insert(space.name.clone(), space.prefixed_name());
    }

    fn register_literal(&mut self, name: &str) {
        self.prefixed.insert(name.to_owned(), name.to_owned());
    }

    /// Presentation name for a declared color space name.
    ///
    /// Under prefixed naming, a name that never entered the graph is a fatal
    /// integrity error, never silently passed through.
    pub fn present(&self, base: &str) -> Result<String, ConfigError> {
        match self.naming {
            Naming::Plain => Ok(base.to_owned()),
            Naming::FamilyPrefixed => self
                .prefixed
                .get(base)
                .cloned()
                .ok_or_else(|| ConfigError::MissingPrefix(base.to_owned())),
        }
    }
}

/// Build state threaded explicitly through the phases: the prefix map, the
/// alias-deferral list, and the look list.
#[derive(Debug, Default)]
pub struct GenerationContext {
    names: NameTable,
    deferred_aliases: Vec<DeferredAlias>,
    looks: Vec<String>,
}

#[derive(Debug, Clone)]
struct DeferredAlias {
    target: String,
    aliases: Vec<String>,
}

/// Assembles the full config document from declarative data.
pub fn build_config(
    data: &ConfigData,
    options: &BuildOptions,
) -> Result<ConfigDocument, ConfigError> {
    let mut ctx = GenerationContext {
        names: NameTable::new(options.naming),
        ..GenerationContext::default()
    };
    let mut doc = ConfigDocument {
        description: options.description.clone(),
        search_paths: options.search_paths.clone(),
        ..ConfigDocument::default()
    };
    let mut displays = data.displays.clone();

    add_reference(&mut doc, &mut ctx, data, options)?;
    synthesize_looks(&mut doc, &mut ctx, data, options)?;
    add_regular_spaces(&mut doc, &mut ctx, data, options)?;
    resolve_roles(&mut doc, &mut ctx, data)?;
    integrate_looks(&mut doc, &mut ctx, data, options, &mut displays)?;
    add_deferred_aliases(&mut doc, &mut ctx, data)?;
    build_displays(&mut doc, &ctx, data, options, &displays)?;
    validate(&doc, data)?;

    doc.names = ctx.names;
    Ok(doc)
}

fn emit_space(
    doc: &mut ConfigDocument,
    ctx: &mut GenerationContext,
    space: ColorSpace,
    defer_aliases: bool,
) -> Result<(), ConfigError> {
    if doc.colorspaces.iter().any(|cs| cs.name == space.name) {
        return Err(ConfigError::DuplicateColorSpace(space.name));
    }
    ctx.names.register(&space);
    if defer_aliases && !space.aliases.is_empty() {
        ctx.deferred_aliases.push(DeferredAlias {
            target: space.name.clone(),
            aliases: space.aliases.clone(),
        });
    }
    debug!(name = %space.name, family = %space.family, "adding color space");
    doc.colorspaces.push(space);
    Ok(())
}

fn emit_alias_space(
    doc: &mut ConfigDocument,
    ctx: &mut GenerationContext,
    space: ColorSpace,
) -> Result<(), ConfigError> {
    if doc.colorspaces.iter().any(|cs| cs.name == space.name) {
        return Err(ConfigError::DuplicateColorSpace(space.name));
    }
    // Alias names are presented exactly as declared, never prefixed.
    ctx.names.register_literal(&space.name);
    doc.colorspaces.push(space);
    Ok(())
}

/// A color space that only redirects to its target through the reference.
fn alias_space(alias_name: &str, target: &ColorSpace, reference: &str, family: &str) -> ColorSpace {
    let mut cs = ColorSpace::new(alias_name);
    cs.description = target.description.clone();
    cs.family = family.to_owned();
    cs.equality_group = target.equality_group.clone();
    cs.is_data = target.is_data;
    cs.bit_depth = target.bit_depth;
    cs.allocation = target.allocation.clone();
    cs.aces_transform_id = target.aces_transform_id.clone();
    if !target.to_reference.is_empty() {
        cs.to_reference.push(TransformStep::ColorSpaceRef {
            src: target.name.clone(),
            dst: reference.to_owned(),
            direction: Direction::Forward,
        });
    }
    if !target.from_reference.is_empty() {
        cs.from_reference.push(TransformStep::ColorSpaceRef {
            src: reference.to_owned(),
            dst: target.name.clone(),
            direction: Direction::Forward,
        });
    }
    cs
}

fn add_reference(
    doc: &mut ConfigDocument,
    ctx: &mut GenerationContext,
    data: &ConfigData,
    options: &BuildOptions,
) -> Result<(), ConfigError> {
    info!(name = %data.reference.name, "adding the reference color space");
    emit_space(doc, ctx, data.reference.clone(), options.aliases)
}

fn synthesize_looks(
    doc: &mut ConfigDocument,
    ctx: &mut GenerationContext,
    data: &ConfigData,
    options: &BuildOptions,
) -> Result<(), ConfigError> {
    for look in &options.looks {
        info!(name = %look.name, "adding look");
        doc.looks.push(LookDef {
            name: look.name.clone(),
            process_space: look.process_space.clone(),
            transform: look.lut_step.clone(),
        });
        emit_space(doc, ctx, look.colorspace(&data.reference.name), options.aliases)?;
    }
    Ok(())
}

fn add_regular_spaces(
    doc: &mut ConfigDocument,
    ctx: &mut GenerationContext,
    data: &ConfigData,
    options: &BuildOptions,
) -> Result<(), ConfigError> {
    // Deterministic flat-list presentation: family first, then name.
    let mut sorted = data.colorspaces.clone();
    sorted.sort_by(|a, b| {
        (a.family.to_lowercase(), a.name.to_lowercase())
            .cmp(&(b.family.to_lowercase(), b.name.to_lowercase()))
    });
    for space in sorted {
        emit_space(doc, ctx, space, options.aliases)?;
    }
    Ok(())
}

fn resolve_roles(
    doc: &mut ConfigDocument,
    ctx: &mut GenerationContext,
    data: &ConfigData,
) -> Result<(), ConfigError> {
    info!("setting the roles");
    for (role, target) in data.roles.pairs() {
        doc.roles.push((role.to_owned(), target.to_owned()));
    }
    // These two always shadow scene_linear.
    doc.roles
        .push(("rendering".to_owned(), data.roles.scene_linear.clone()));
    doc.roles.push((
        "compositing_linear".to_owned(),
        data.roles.scene_linear.clone(),
    ));

    for (role, target) in data.roles.pairs() {
        let target_space = find_space(data, target).ok_or_else(|| {
            ConfigError::RoleTargetMissing {
                role: role.to_owned(),
                target: target.to_owned(),
            }
        })?;

        // The alias color space must not collide with the bare role name.
        ctx.deferred_aliases.push(DeferredAlias {
            target: target_space.name.clone(),
            aliases: vec![format!("role_{role}")],
        });
        let presented = alias_space(
            &format!("Role - {role}"),
            target_space,
            &data.reference.name,
            "Utility/Roles",
        );
        debug!(role, target = %target_space.name, "adding role alias color space");
        emit_alias_space(doc, ctx, presented)?;
    }
    Ok(())
}

fn integrate_looks(
    doc: &mut ConfigDocument,
    ctx: &mut GenerationContext,
    data: &ConfigData,
    options: &BuildOptions,
    displays: &mut BTreeMap<String, Vec<View>>,
) -> Result<(), ConfigError> {
    if options.looks.is_empty() {
        return Ok(());
    }
    let look_names: Vec<String> = options.looks.iter().map(|l| l.name.clone()).collect();
    ctx.looks = look_names.clone();

    if options.look_policy == LookPolicy::MultiDisplay {
        // Looks ride as view metadata; the display phase attaches them.
        return Ok(());
    }

    let joined = look_names.join(", ");
    for (display, views) in displays.iter_mut() {
        let Some(anchor) = views.iter().find(|v| v.name == "Output Transform") else {
            continue;
        };
        let space = doc
            .colorspaces
            .iter()
            .find(|cs| cs.name == anchor.colorspace)
            .ok_or_else(|| ConfigError::ViewTargetMissing {
                display: display.clone(),
                view: anchor.name.clone(),
                target: anchor.colorspace.clone(),
            })?;

        let augmented = augment_with_looks(space, &look_names, &data.reference.name);
        info!(display = %display, name = %augmented.name, "adding look-augmented view");
        let view = View::new(format!("Output Transform with {joined}"), augmented.name.clone());
        emit_space(doc, ctx, augmented, options.aliases)?;
        views.push(view);
    }
    Ok(())
}

fn add_deferred_aliases(
    doc: &mut ConfigDocument,
    ctx: &mut GenerationContext,
    data: &ConfigData,
) -> Result<(), ConfigError> {
    // Aliases land at the end of the list so primary definitions come first
    // for consumers that present color spaces in declaration order.
    let deferred = std::mem::take(&mut ctx.deferred_aliases);
    for entry in deferred {
        let Some(target) = doc.colorspaces.iter().find(|cs| cs.name == entry.target) else {
            return Err(ConfigError::AliasTargetMissing(entry.target));
        };
        let target = target.clone();
        for alias in entry.aliases {
            if alias.eq_ignore_ascii_case(&target.name) {
                warn!(alias = %alias, target = %target.name, "skipping alias; names match case-insensitively");
                continue;
            }
            let space = alias_space(&alias, &target, &data.reference.name, "Utility/Aliases");
            emit_alias_space(doc, ctx, space)?;
        }
    }
    Ok(())
}

fn build_displays(
    doc: &mut ConfigDocument,
    ctx: &GenerationContext,
    data: &ConfigData,
    options: &BuildOptions,
    displays: &BTreeMap<String, Vec<View>>,
) -> Result<(), ConfigError> {
    info!("adding the displays and views");
    match options.look_policy {
        LookPolicy::MultiDisplay => {
            for (display, views) in displays {
                let mut view_defs = Vec::new();
                for view in views {
                    if !ctx.looks.is_empty() {
                        view_defs.push(ViewDef {
                            name: view.name.clone(),
                            colorspace: view.colorspace.clone(),
                            looks: ctx.looks.clone(),
                        });
                    } else {
                        view_defs.push(ViewDef {
                            name: view.name.clone(),
                            colorspace: view.colorspace.clone(),
                            looks: Vec::new(),
                        });
                    }
                    if !doc.active_views.iter().any(|v| v == &view.name) {
                        doc.active_views.push(view.name.clone());
                    }
                }
                doc.displays.push(DisplayDef {
                    name: display.clone(),
                    views: view_defs,
                });
                doc.active_displays.push(display.clone());
            }
            doc.active_displays.sort();
        }
        LookPolicy::SingleDisplay => {
            let single = options.single_display_name.clone();
            let mut ordered: Vec<&String> = displays.keys().collect();
            if let Some(index) = ordered.iter().position(|d| **d == data.default_display) {
                let default = ordered.remove(index);
                ordered.insert(0, default);
            }

            let joined = ctx.looks.join(", ");
            let mut view_defs = Vec::new();
            for display in ordered {
                for view in &displays[display] {
                    if !view.name.contains("Output Transform") {
                        continue;
                    }
                    // The display names become the view names of the single
                    // merged display.
                    let mut view_name = sanitize_view_name(display);
                    if view.name.contains("with") {
                        view_name = format!("{view_name} with {joined}");
                    }
                    if view_defs.iter().any(|v: &ViewDef| v.name == view_name) {
                        continue;
                    }
                    doc.active_views.push(view_name.clone());
                    view_defs.push(ViewDef {
                        name: view_name,
                        colorspace: view.colorspace.clone(),
                        looks: Vec::new(),
                    });
                }
            }

            // Fixed utility views.
            view_defs.push(ViewDef {
                name: "Raw".to_owned(),
                colorspace: data.roles.data.clone(),
                looks: Vec::new(),
            });
            doc.active_views.push("Raw".to_owned());
            view_defs.push(ViewDef {
                name: "Log".to_owned(),
                colorspace: data.roles.compositing_log.clone(),
                looks: Vec::new(),
            });
            doc.active_views.push("Log".to_owned());

            doc.displays.push(DisplayDef {
                name: single.clone(),
                views: view_defs,
            });
            doc.active_displays.push(single);
        }
    }
    Ok(())
}

fn validate(doc: &ConfigDocument, data: &ConfigData) -> Result<(), ConfigError> {
    let mut seen = std::collections::BTreeSet::new();
    for space in &doc.colorspaces {
        if !seen.insert(space.name.as_str()) {
            return Err(ConfigError::DuplicateColorSpace(space.name.clone()));
        }
    }
    for display in &doc.displays {
        for view in &display.views {
            if !seen.contains(view.colorspace.as_str()) {
                return Err(ConfigError::ViewTargetMissing {
                    display: display.name.clone(),
                    view: view.name.clone(),
                    target: view.colorspace.clone(),
                });
            }
        }
    }
    for (role, target) in &doc.roles {
        if find_space(data, target).is_none() {
            return Err(ConfigError::RoleTargetMissing {
                role: role.clone(),
                target: target.clone(),
            });
        }
    }
    Ok(())
}

fn find_space<'a>(data: &'a ConfigData, name: &str) -> Option<&'a ColorSpace> {
    if data.reference.name == name {
        return Some(&data.reference);
    }
    data.colorspaces.iter().find(|cs| cs.name == name)
}
