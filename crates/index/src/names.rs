//! Qualified names the engine recognises.

pub const CONTRIBUTES_TO: &str = "graft.annotations.ContributesTo";
pub const CONTRIBUTES_BINDING: &str = "graft.annotations.ContributesBinding";
pub const CONTRIBUTES_MULTIBINDING: &str = "graft.annotations.ContributesMultibinding";
pub const CONTRIBUTES_SUBCOMPONENT: &str = "graft.annotations.ContributesSubcomponent";
pub const CONTRIBUTES_SUBCOMPONENT_FACTORY: &str = "graft.annotations.ContributesSubcomponent.Factory";

pub const MERGE_COMPONENT: &str = "graft.annotations.MergeComponent";
pub const MERGE_SUBCOMPONENT: &str = "graft.annotations.MergeSubcomponent";
pub const MERGE_MODULES: &str = "graft.annotations.compat.MergeModules";
pub const MERGE_INTERFACES: &str = "graft.annotations.compat.MergeInterfaces";

pub const INTERNAL_BINDING_MARKER: &str = "graft.annotations.internal.InternalBindingMarker";

pub const DAGGER_MODULE: &str = "dagger.Module";
pub const DAGGER_COMPONENT: &str = "dagger.Component";
pub const DAGGER_SUBCOMPONENT: &str = "dagger.Subcomponent";
pub const DAGGER_SUBCOMPONENT_FACTORY: &str = "dagger.Subcomponent.Factory";
pub const DAGGER_BINDS: &str = "dagger.Binds";
pub const DAGGER_PROVIDES: &str = "dagger.Provides";
pub const DAGGER_INTO_SET: &str = "dagger.multibindings.IntoSet";
pub const DAGGER_INTO_MAP: &str = "dagger.multibindings.IntoMap";
pub const DAGGER_MAP_KEY: &str = "dagger.MapKey";
pub const QUALIFIER: &str = "javax.inject.Qualifier";

/// Universal top type, never inferred as a bound type.
pub const ANY: &str = "kotlin.Any";

/// Package holding hint markers.
pub const HINT_PACKAGE: &str = "graft.hint";
/// Root package of generated subcomponents.
pub const COMPONENT_PACKAGE: &str = "graft.component";

pub const REFERENCE_SUFFIX: &str = "_reference";
pub const SCOPE_SUFFIX: &str = "_scope";

/// Short name of a qualified name, for diagnostics.
pub fn short(name: &str) -> &str {
	name.rsplit_once('.').map_or(name, |(_, short)| short)
}
