// ─── Internal helper: one optional dependency entry ──────────────────────────

/// Internal helper: turns one `optional: [...]` element into an
/// `OptionalDependency`.  A string literal is a single name; a bracketed list
/// is an alternative group.
#[macro_export]
#[doc(hidden)]
macro_rules! __optional_dependency {
    ($name:literal) => {
        $crate::__private::OptionalDependency::Single(::std::string::String::from($name))
    };
    ([$($alt:literal),* $(,)?]) => {
        $crate::__private::OptionalDependency::AnyOf(
            ::std::vec![$(::std::string::String::from($alt)),*],
        )
    };
}

// ─── define_module! ──────────────────────────────────────────────────────────

/// Creates a [`ModuleEntry`](crate::module::ModuleEntry): a descriptor plus
/// its async initializer.
///
/// # Syntax
///
/// ```rust,ignore
/// use pulse::prelude::*;
///
/// fn chat_module() -> ModuleEntry {
///     define_module! {
///         name: "chat",
///
///         version:     "1.2.0",
///         description: "Chat front end.",
///         author:      "Pulse Contributors",
///
///         requires:    ["storage"],
///         // A bare name is one optional dependency; a list is a group of
///         // alternatives satisfied by any one member.
///         optional:    ["logger", ["sqlite", "postgres"]],
///         third_party: ["regex"],
///
///         init: Chat::init,   // async fn(ModuleContext) -> Result<Chat, E>
///     }
/// }
/// ```
///
/// ## Field reference
///
/// | Field | Required | Default |
/// |-------|----------|---------|
/// | `name` | ✓ | Must be **first**. |
/// | `version` | | `CARGO_PKG_VERSION` of the defining crate |
/// | `description` | | `CARGO_PKG_DESCRIPTION` of the defining crate |
/// | `author` | | `CARGO_PKG_AUTHORS` of the defining crate |
/// | `requires` | | `[]` |
/// | `optional` | | `[]` |
/// | `third_party` | | `[]` |
/// | `init` | ✓ | |
#[macro_export]
macro_rules! define_module {
    // ── Entry ─────────────────────────────────────────────────────────────────
    //
    // Accumulator slots:
    //   [$($d)*]     descriptor builder expression, extended per field
    //   [$($init)?]  initializer expression
    (name: $name:literal $(, $($tail:tt)*)?) => {
        $crate::define_module!(
            @acc [
                $crate::__private::ModuleDescriptor::new($name)
                    .version(::std::env!("CARGO_PKG_VERSION"))
                    .description(::std::env!("CARGO_PKG_DESCRIPTION"))
                    .author(::std::env!("CARGO_PKG_AUTHORS"))
            ] []
            $($($tail)*)?
        )
    };

    // ── Accumulator: skip stray commas ────────────────────────────────────────
    (@acc $d:tt $init:tt , $($rest:tt)*) => {
        $crate::define_module!(@acc $d $init $($rest)*)
    };

    (@acc [$($d:tt)*] $init:tt version: $v:literal $($rest:tt)*) => {
        $crate::define_module!(@acc [$($d)* .version($v)] $init $($rest)*)
    };

    (@acc [$($d:tt)*] $init:tt description: $v:literal $($rest:tt)*) => {
        $crate::define_module!(@acc [$($d)* .description($v)] $init $($rest)*)
    };

    (@acc [$($d:tt)*] $init:tt author: $v:literal $($rest:tt)*) => {
        $crate::define_module!(@acc [$($d)* .author($v)] $init $($rest)*)
    };

    (@acc [$($d:tt)*] $init:tt requires: [$($r:literal),* $(,)?] $($rest:tt)*) => {
        $crate::define_module!(
            @acc [$($d)* .requires(<[&str]>::iter(&[$($r),*]).copied())] $init $($rest)*
        )
    };

    (@acc [$($d:tt)*] $init:tt optional: [$($o:tt),* $(,)?] $($rest:tt)*) => {
        $crate::define_module!(
            @acc [
                $($d)*
                $(.optional_group($crate::__optional_dependency!($o)))*
            ] $init $($rest)*
        )
    };

    (@acc [$($d:tt)*] $init:tt third_party: [$($p:literal),* $(,)?] $($rest:tt)*) => {
        $crate::define_module!(
            @acc [$($d)* .third_party(<[&str]>::iter(&[$($p),*]).copied())] $init $($rest)*
        )
    };

    // ── init: expr , <more fields> ────────────────────────────────────────────
    (@acc $d:tt [] init: $f:expr , $($rest:tt)+) => {
        $crate::define_module!(@acc $d [$f] $($rest)+)
    };

    // ── init: expr (last field) ───────────────────────────────────────────────
    (@acc $d:tt [] init: $f:expr $(,)?) => {
        $crate::define_module!(@acc $d [$f])
    };

    // ── Terminal ──────────────────────────────────────────────────────────────
    (@acc [$($d:tt)*] [$init:expr]) => {
        $crate::module::ModuleEntry::new($($d)*, $init)
    };

    (@acc $d:tt []) => {
        ::std::compile_error!("define_module! requires an `init` field")
    };
}

// ─── register_module! ────────────────────────────────────────────────────────

/// Registers a module constructor in the link-time module list read by
/// [`LinkedDiscovery`](crate::discovery::LinkedDiscovery).
///
/// ```rust,ignore
/// fn storage() -> ModuleEntry {
///     define_module! { name: "storage", init: Storage::init }
/// }
///
/// register_module!(STORAGE = storage);
/// ```
#[macro_export]
macro_rules! register_module {
    ($vis:vis $slot:ident = $ctor:path $(;)?) => {
        #[$crate::__private::linkme::distributed_slice($crate::discovery::MODULES)]
        #[linkme(crate = $crate::__private::linkme)]
        $vis static $slot: fn() -> $crate::module::ModuleEntry = $ctor;
    };
}
