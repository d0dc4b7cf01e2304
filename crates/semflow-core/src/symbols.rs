//! The symbol table built by type checking.
//!
//! Bound nodes and operations never own symbols: they hold [`SymbolId`]
//! handles (and [`TypeHash`] identities) into a [`SymbolTable`] that
//! outlives every tree built from it. The table is read-only once binding
//! is done, so it can be shared across threads building different bodies.

use rustc_hash::FxHashMap;

use crate::error::SymbolError;
use crate::{ConstantValue, SymbolId, TypeHash, primitives};

// ============================================================================
// Types
// ============================================================================

/// Broad classification of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Void,
    Primitive,
    Class,
    Struct,
    Interface,
    Delegate,
    TypeParameter,
    Pointer,
    FunctionPointer,
    Dynamic,
    Error,
}

/// Arithmetic category of a primitive, used by constant folding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    Signed(u8),
    Unsigned(u8),
    Float(u8),
    Char,
}

impl NumericKind {
    /// Inclusive range of an integral kind.
    pub fn integer_bounds(self) -> Option<(i128, i128)> {
        match self {
            NumericKind::Signed(bits) => {
                let max = (1i128 << (bits - 1)) - 1;
                Some((-max - 1, max))
            }
            NumericKind::Unsigned(bits) => Some((0, (1i128 << bits) - 1)),
            NumericKind::Char => Some((0, u16::MAX as i128)),
            NumericKind::Float(_) => None,
        }
    }
}

/// A registered type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeEntry {
    pub hash: TypeHash,
    /// Display name, e.g. `int`, `List<int>`, `delegate*<void>`.
    pub name: String,
    pub kind: TypeKind,
    pub numeric: Option<NumericKind>,
    /// `sizeof` result for unmanaged types with a fixed size.
    pub size: Option<u32>,
    pub is_reference_type: bool,
    /// Pointee of a pointer type.
    pub element: Option<TypeHash>,
}

impl TypeEntry {
    /// A user-declared type with the given kind.
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        let name = name.into();
        Self {
            hash: TypeHash::from_name(&name),
            is_reference_type: matches!(
                kind,
                TypeKind::Class | TypeKind::Interface | TypeKind::Delegate | TypeKind::Dynamic
            ),
            name,
            kind,
            numeric: None,
            size: None,
            element: None,
        }
    }

    fn primitive(name: &str, numeric: Option<NumericKind>, size: Option<u32>) -> Self {
        Self {
            numeric,
            size,
            ..Self::new(name, TypeKind::Primitive)
        }
    }
}

// ============================================================================
// Symbols
// ============================================================================

/// How an argument or parameter is passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RefKind {
    #[default]
    None,
    Ref,
    Out,
    In,
}

impl RefKind {
    pub fn keyword(self) -> &'static str {
        match self {
            RefKind::None => "None",
            RefKind::Ref => "Ref",
            RefKind::Out => "Out",
            RefKind::In => "In",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    Ordinary,
    Constructor,
    AnonymousFunction,
    UserDefinedOperator,
    LocalFunction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalSymbol {
    pub name: String,
    pub ty: TypeHash,
    pub is_ref: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSymbol {
    pub name: String,
    pub ty: TypeHash,
    pub ordinal: u32,
    pub ref_kind: RefKind,
    /// Value used when the argument is omitted.
    pub default_value: Option<ConstantValue>,
    pub owner: SymbolId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSymbol {
    pub name: String,
    pub ty: TypeHash,
    pub container: TypeHash,
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertySymbol {
    pub name: String,
    pub ty: TypeHash,
    pub container: TypeHash,
    pub is_static: bool,
    /// Indexer parameters; empty for ordinary properties.
    pub parameters: Vec<SymbolId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventSymbol {
    pub name: String,
    pub ty: TypeHash,
    pub container: TypeHash,
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodSymbol {
    pub name: String,
    pub return_type: TypeHash,
    pub container: Option<TypeHash>,
    pub kind: MethodKind,
    pub is_static: bool,
    pub is_virtual: bool,
    pub is_async: bool,
    pub parameters: Vec<SymbolId>,
}

impl MethodSymbol {
    /// An ordinary static method with no parameters yet.
    pub fn new(name: impl Into<String>, return_type: TypeHash, container: Option<TypeHash>) -> Self {
        Self {
            name: name.into(),
            return_type,
            container,
            kind: MethodKind::Ordinary,
            is_static: true,
            is_virtual: false,
            is_async: false,
            parameters: Vec::new(),
        }
    }

    pub fn instance(mut self) -> Self {
        self.is_static = false;
        self
    }

    pub fn with_kind(mut self, kind: MethodKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn virtual_(mut self) -> Self {
        self.is_static = false;
        self.is_virtual = true;
        self
    }

    pub fn async_(mut self) -> Self {
        self.is_async = true;
        self
    }
}

/// Any symbol a bound node can refer to.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Local(LocalSymbol),
    Parameter(ParameterSymbol),
    Field(FieldSymbol),
    Property(PropertySymbol),
    Event(EventSymbol),
    Method(MethodSymbol),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Local(s) => &s.name,
            Symbol::Parameter(s) => &s.name,
            Symbol::Field(s) => &s.name,
            Symbol::Property(s) => &s.name,
            Symbol::Event(s) => &s.name,
            Symbol::Method(s) => &s.name,
        }
    }

    /// Declared type; the return type for methods.
    pub fn ty(&self) -> TypeHash {
        match self {
            Symbol::Local(s) => s.ty,
            Symbol::Parameter(s) => s.ty,
            Symbol::Field(s) => s.ty,
            Symbol::Property(s) => s.ty,
            Symbol::Event(s) => s.ty,
            Symbol::Method(s) => s.return_type,
        }
    }

    /// Whether accessing this member needs an instance receiver.
    pub fn requires_instance(&self) -> bool {
        match self {
            Symbol::Field(s) => !s.is_static,
            Symbol::Property(s) => !s.is_static,
            Symbol::Event(s) => !s.is_static,
            Symbol::Method(s) => !s.is_static && s.kind != MethodKind::Constructor,
            Symbol::Local(_) | Symbol::Parameter(_) => false,
        }
    }

    /// Containing type of a member.
    pub fn container(&self) -> Option<TypeHash> {
        match self {
            Symbol::Field(s) => Some(s.container),
            Symbol::Property(s) => Some(s.container),
            Symbol::Event(s) => Some(s.container),
            Symbol::Method(s) => s.container,
            Symbol::Local(_) | Symbol::Parameter(_) => None,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Symbol::Local(_) => "local",
            Symbol::Parameter(_) => "parameter",
            Symbol::Field(_) => "field",
            Symbol::Property(_) => "property",
            Symbol::Event(_) => "event",
            Symbol::Method(_) => "method",
        }
    }
}

// ============================================================================
// Table
// ============================================================================

/// Arena of symbols plus a hash-indexed type registry.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    types: FxHashMap<TypeHash, TypeEntry>,
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    /// An empty table. Most callers want [`SymbolTable::with_primitives`].
    pub fn new() -> Self {
        Self::default()
    }

    /// A table with every built-in type registered.
    pub fn with_primitives() -> Self {
        use NumericKind::*;

        let mut table = Self::new();
        let builtins = [
            TypeEntry::new("void", TypeKind::Void),
            TypeEntry::primitive("bool", None, Some(1)),
            TypeEntry::primitive("char", Some(Char), Some(2)),
            TypeEntry::primitive("sbyte", Some(Signed(8)), Some(1)),
            TypeEntry::primitive("byte", Some(Unsigned(8)), Some(1)),
            TypeEntry::primitive("short", Some(Signed(16)), Some(2)),
            TypeEntry::primitive("ushort", Some(Unsigned(16)), Some(2)),
            TypeEntry::primitive("int", Some(Signed(32)), Some(4)),
            TypeEntry::primitive("uint", Some(Unsigned(32)), Some(4)),
            TypeEntry::primitive("long", Some(Signed(64)), Some(8)),
            TypeEntry::primitive("ulong", Some(Unsigned(64)), Some(8)),
            TypeEntry::primitive("float", Some(Float(32)), Some(4)),
            TypeEntry::primitive("double", Some(Float(64)), Some(8)),
            TypeEntry {
                is_reference_type: true,
                ..TypeEntry::new("string", TypeKind::Class)
            },
            TypeEntry::new("object", TypeKind::Class),
            TypeEntry::new("dynamic", TypeKind::Dynamic),
            TypeEntry::new("?", TypeKind::Error),
            TypeEntry::new("System.Exception", TypeKind::Class),
        ];
        for entry in builtins {
            table.types.insert(entry.hash, entry);
        }
        table.pointer_type(primitives::ERROR);
        table
    }

    // ------------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------------

    /// Register a type, rejecting duplicates.
    pub fn register_type(&mut self, entry: TypeEntry) -> Result<TypeHash, SymbolError> {
        if self.types.contains_key(&entry.hash) {
            return Err(SymbolError::DuplicateType { name: entry.name });
        }
        let hash = entry.hash;
        self.types.insert(hash, entry);
        Ok(hash)
    }

    /// The pointer type `element*`, registered on first use.
    pub fn pointer_type(&mut self, element: TypeHash) -> TypeHash {
        let hash = TypeHash::pointer_to(element);
        if !self.types.contains_key(&hash) {
            let name = format!("{}*", self.type_name(element));
            self.types.insert(
                hash,
                TypeEntry {
                    hash,
                    element: Some(element),
                    size: Some(8),
                    ..TypeEntry::new(name, TypeKind::Pointer)
                },
            );
        }
        hash
    }

    /// A function pointer type with the given display name, e.g.
    /// `delegate*<void>`, registered on first use.
    pub fn function_pointer_type(&mut self, display: &str) -> TypeHash {
        let hash = TypeHash::from_name(display);
        self.types.entry(hash).or_insert_with(|| TypeEntry {
            size: Some(8),
            ..TypeEntry::new(display, TypeKind::FunctionPointer)
        });
        hash
    }

    pub fn type_entry(&self, hash: TypeHash) -> Option<&TypeEntry> {
        self.types.get(&hash)
    }

    /// Lookup that reports unknown hashes as an error.
    pub fn try_type_entry(&self, hash: TypeHash) -> Result<&TypeEntry, SymbolError> {
        self.types.get(&hash).ok_or(SymbolError::UnknownType { hash })
    }

    /// Display name of a type; unknown hashes print as their hex value.
    pub fn type_name(&self, hash: TypeHash) -> String {
        match self.types.get(&hash) {
            Some(entry) => entry.name.clone(),
            None => hash.to_string(),
        }
    }

    pub fn type_kind(&self, hash: TypeHash) -> Option<TypeKind> {
        self.types.get(&hash).map(|t| t.kind)
    }

    pub fn is_dynamic(&self, hash: TypeHash) -> bool {
        self.type_kind(hash) == Some(TypeKind::Dynamic)
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    // ------------------------------------------------------------------------
    // Symbols
    // ------------------------------------------------------------------------

    fn push(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId::new(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    pub fn add_local(&mut self, name: impl Into<String>, ty: TypeHash) -> SymbolId {
        self.push(Symbol::Local(LocalSymbol {
            name: name.into(),
            ty,
            is_ref: false,
        }))
    }

    pub fn add_method(&mut self, method: MethodSymbol) -> SymbolId {
        self.push(Symbol::Method(method))
    }

    /// Append a parameter to a method, or to an indexer property.
    pub fn add_parameter(
        &mut self,
        owner: SymbolId,
        name: impl Into<String>,
        ty: TypeHash,
        ref_kind: RefKind,
        default_value: Option<ConstantValue>,
    ) -> Result<SymbolId, SymbolError> {
        let ordinal = match self.symbol(owner)? {
            Symbol::Method(m) => m.parameters.len() as u32,
            Symbol::Property(p) => p.parameters.len() as u32,
            other => {
                return Err(SymbolError::WrongSymbolKind {
                    id: owner,
                    expected: "method or indexer",
                    found: other.kind_name(),
                });
            }
        };
        let id = self.push(Symbol::Parameter(ParameterSymbol {
            name: name.into(),
            ty,
            ordinal,
            ref_kind,
            default_value,
            owner,
        }));
        match &mut self.symbols[owner.as_usize()] {
            Symbol::Method(m) => m.parameters.push(id),
            Symbol::Property(p) => p.parameters.push(id),
            _ => {}
        }
        Ok(id)
    }

    pub fn add_field(&mut self, name: impl Into<String>, ty: TypeHash, container: TypeHash, is_static: bool) -> SymbolId {
        self.push(Symbol::Field(FieldSymbol {
            name: name.into(),
            ty,
            container,
            is_static,
        }))
    }

    pub fn add_property(&mut self, name: impl Into<String>, ty: TypeHash, container: TypeHash, is_static: bool) -> SymbolId {
        self.push(Symbol::Property(PropertySymbol {
            name: name.into(),
            ty,
            container,
            is_static,
            parameters: Vec::new(),
        }))
    }

    pub fn add_event(&mut self, name: impl Into<String>, ty: TypeHash, container: TypeHash, is_static: bool) -> SymbolId {
        self.push(Symbol::Event(EventSymbol {
            name: name.into(),
            ty,
            container,
            is_static,
        }))
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.as_usize())
    }

    /// Lookup that reports dangling handles as an error.
    pub fn symbol(&self, id: SymbolId) -> Result<&Symbol, SymbolError> {
        self.get(id).ok_or(SymbolError::UnknownSymbol { id })
    }

    pub fn method(&self, id: SymbolId) -> Result<&MethodSymbol, SymbolError> {
        match self.symbol(id)? {
            Symbol::Method(m) => Ok(m),
            other => Err(SymbolError::WrongSymbolKind {
                id,
                expected: "method",
                found: other.kind_name(),
            }),
        }
    }

    pub fn parameter(&self, id: SymbolId) -> Result<&ParameterSymbol, SymbolError> {
        match self.symbol(id)? {
            Symbol::Parameter(p) => Ok(p),
            other => Err(SymbolError::WrongSymbolKind {
                id,
                expected: "parameter",
                found: other.kind_name(),
            }),
        }
    }

    /// Simple name of a symbol, `?` for dangling handles.
    pub fn name(&self, id: SymbolId) -> &str {
        self.get(id).map(Symbol::name).unwrap_or("?")
    }

    /// Signature-style display used by dumps: `int C.M(int, string)`.
    pub fn display(&self, id: SymbolId) -> String {
        let Some(symbol) = self.get(id) else {
            return format!("<{id}>");
        };
        match symbol {
            Symbol::Method(m) => {
                let params = m
                    .parameters
                    .iter()
                    .map(|p| self.display_parameter(*p))
                    .collect::<Vec<_>>()
                    .join(", ");
                let owner = m.container.map(|c| format!("{}.", self.type_name(c))).unwrap_or_default();
                let prefix = if m.is_virtual { "virtual " } else { "" };
                format!("{prefix}{} {owner}{}({params})", self.type_name(m.return_type), m.name)
            }
            Symbol::Parameter(_) => self.display_parameter(id),
            Symbol::Local(l) => format!("{} {}", self.type_name(l.ty), l.name),
            other => {
                let owner = other.container().map(|c| format!("{}.", self.type_name(c))).unwrap_or_default();
                format!("{} {owner}{}", self.type_name(other.ty()), other.name())
            }
        }
    }

    fn display_parameter(&self, id: SymbolId) -> String {
        match self.get(id) {
            Some(Symbol::Parameter(p)) => {
                let modifier = match p.ref_kind {
                    RefKind::None => "",
                    RefKind::Ref => "ref ",
                    RefKind::Out => "out ",
                    RefKind::In => "in ",
                };
                format!("{modifier}{} {}", self.type_name(p.ty), p.name)
            }
            _ => format!("<{id}>"),
        }
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with_widget() -> (SymbolTable, TypeHash) {
        let mut table = SymbolTable::with_primitives();
        let widget = table.register_type(TypeEntry::new("Widget", TypeKind::Class)).unwrap();
        (table, widget)
    }

    #[test]
    fn primitives_registered() {
        let table = SymbolTable::with_primitives();
        assert_eq!(table.type_name(primitives::INT32), "int");
        assert_eq!(table.type_entry(primitives::INT32).unwrap().size, Some(4));
        assert!(table.is_dynamic(primitives::DYNAMIC));
        assert_eq!(table.type_name(primitives::ERROR_POINTER), "?*");
    }

    #[test]
    fn duplicate_type_rejected() {
        let (mut table, _) = table_with_widget();
        let err = table.register_type(TypeEntry::new("Widget", TypeKind::Class)).unwrap_err();
        assert_eq!(err, SymbolError::DuplicateType { name: "Widget".into() });
    }

    #[test]
    fn parameters_get_ordinals() {
        let (mut table, widget) = table_with_widget();
        let m = table.add_method(MethodSymbol::new("M", primitives::VOID, Some(widget)).instance());
        let a = table.add_parameter(m, "a", primitives::INT32, RefKind::None, None).unwrap();
        let b = table
            .add_parameter(m, "b", primitives::STRING, RefKind::Ref, Some(ConstantValue::Null))
            .unwrap();

        assert_eq!(table.parameter(a).unwrap().ordinal, 0);
        assert_eq!(table.parameter(b).unwrap().ordinal, 1);
        assert_eq!(table.method(m).unwrap().parameters, vec![a, b]);
        assert_eq!(table.display(m), "void Widget.M(int a, ref string b)");
    }

    #[test]
    fn parameter_on_field_is_an_error() {
        let (mut table, widget) = table_with_widget();
        let f = table.add_field("f", primitives::INT32, widget, false);
        let err = table.add_parameter(f, "x", primitives::INT32, RefKind::None, None);
        assert!(matches!(err, Err(SymbolError::WrongSymbolKind { .. })));
    }

    #[test]
    fn requires_instance() {
        let (mut table, widget) = table_with_widget();
        let field = table.add_field("f", primitives::INT32, widget, false);
        let stat = table.add_field("s", primitives::INT32, widget, true);
        let ctor = table.add_method(
            MethodSymbol::new(".ctor", primitives::VOID, Some(widget))
                .instance()
                .with_kind(MethodKind::Constructor),
        );
        assert!(table.symbol(field).unwrap().requires_instance());
        assert!(!table.symbol(stat).unwrap().requires_instance());
        assert!(!table.symbol(ctor).unwrap().requires_instance());
    }

    #[test]
    fn dangling_handle_is_reported() {
        let table = SymbolTable::with_primitives();
        let id = SymbolId::new(99);
        assert_eq!(table.symbol(id), Err(SymbolError::UnknownSymbol { id }));
        assert_eq!(table.name(id), "?");
    }

    #[test]
    fn integer_bounds() {
        assert_eq!(NumericKind::Signed(8).integer_bounds(), Some((-128, 127)));
        assert_eq!(NumericKind::Unsigned(16).integer_bounds(), Some((0, 65535)));
        assert_eq!(NumericKind::Float(64).integer_bounds(), None);
    }
}
