//! Registry of every type known to a generation run.
//!
//! Built-ins, `java.lang.Object` and `java.lang.String` are registered up
//! front. Klasses, interfaces and array types are added while the program
//! is generated. The registry is transactional: [`TypeList::checkpoint`]
//! marks a point that [`TypeList::rollback`] can return to, which is how a
//! failed class production removes the half-built type again.

use rustc_hash::FxHashMap;

use super::klass::{KlassFlags, KlassInfo};
use super::{BuiltInType, Type, OBJECT, STRING};
use crate::error::{ProductionError, ProductionResult};

/// Opaque marker returned by [`TypeList::checkpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeListMark(usize);

#[derive(Debug, Clone)]
pub struct TypeList {
    /// Registration order. Lookups that enumerate types use this order so
    /// that generation stays deterministic.
    types: Vec<Type>,
    index: FxHashMap<Type, usize>,
    klasses: FxHashMap<String, KlassInfo>,
}

impl Default for TypeList {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeList {
    pub fn new() -> Self {
        let mut list = Self {
            types: Vec::new(),
            index: FxHashMap::default(),
            klasses: FxHashMap::default(),
        };
        for builtin in BuiltInType::VALUE_TYPES {
            list.add(Type::BuiltIn(builtin));
        }
        list.add(Type::VOID);
        list.add_klass(KlassInfo::new(OBJECT, None, KlassFlags::empty()));
        list.add_klass(KlassInfo::new(
            STRING,
            Some(OBJECT.to_string()),
            KlassFlags::FINAL,
        ));
        list
    }

    // -- Queries ------------------------------------------------------------

    /// Every registered value type, in registration order. `void` is
    /// excluded.
    pub fn get_all(&self) -> Vec<Type> {
        self.types.iter().filter(|t| !t.is_void()).cloned().collect()
    }

    /// Built-in value types.
    pub fn get_builtin(&self) -> Vec<Type> {
        BuiltInType::VALUE_TYPES.iter().copied().map(Type::BuiltIn).collect()
    }

    /// Integral built-ins: byte, char, short, int, long.
    pub fn get_builtin_int(&self) -> Vec<Type> {
        BuiltInType::VALUE_TYPES
            .iter()
            .copied()
            .filter(|b| b.is_integral())
            .map(Type::BuiltIn)
            .collect()
    }

    pub fn is_builtin_int(&self, ty: &Type) -> bool {
        ty.is_integral()
    }

    /// Registered klasses and interfaces, in registration order.
    pub fn get_klasses(&self) -> Vec<&KlassInfo> {
        self.types
            .iter()
            .filter_map(|t| t.klass_name())
            .filter_map(|name| self.klasses.get(name))
            .collect()
    }

    pub fn contains(&self, ty: &Type) -> bool {
        self.index.contains_key(ty)
    }

    /// Resolve a name to a registered type.
    pub fn find(&self, name: &str) -> ProductionResult<Type> {
        self.types
            .iter()
            .find(|t| t.to_string() == name)
            .cloned()
            .ok_or_else(|| ProductionError::failed("type is not registered"))
    }

    pub fn klass(&self, name: &str) -> Option<&KlassInfo> {
        self.klasses.get(name)
    }

    pub fn klass_of(&self, ty: &Type) -> Option<&KlassInfo> {
        ty.klass_name().and_then(|name| self.klasses.get(name))
    }

    pub fn klass_mut(&mut self, name: &str) -> Option<&mut KlassInfo> {
        self.klasses.get_mut(name)
    }

    /// All transitive supertypes of `name` (parents and interfaces),
    /// nearest first, without duplicates. `name` itself is not included.
    pub fn ancestors(&self, name: &str) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let mut queue: std::collections::VecDeque<String> = std::collections::VecDeque::new();
        if let Some(info) = self.klasses.get(name) {
            queue.extend(info.supertypes().cloned());
        }
        while let Some(next) = queue.pop_front() {
            if out.contains(&next) || next == name {
                continue;
            }
            if let Some(info) = self.klasses.get(&next) {
                queue.extend(info.supertypes().cloned());
            }
            out.push(next);
        }
        out
    }

    /// `sub` equals `sup` or inherits from it.
    pub fn is_subtype_of(&self, sub: &str, sup: &str) -> bool {
        sub == sup || sup == OBJECT || self.ancestors(sub).iter().any(|a| a == sup)
    }

    // -- Mutation -----------------------------------------------------------

    /// Register a type. Adding an already known type is a no-op.
    pub fn add(&mut self, ty: Type) {
        if self.index.contains_key(&ty) {
            return;
        }
        self.index.insert(ty.clone(), self.types.len());
        self.types.push(ty);
    }

    /// Register a klass or interface and link it into its supertypes'
    /// child lists. Re-registering a known name is a no-op.
    pub fn add_klass(&mut self, info: KlassInfo) {
        let ty = info.as_type();
        if self.index.contains_key(&ty) {
            return;
        }
        let supertypes: Vec<String> = info.supertypes().cloned().collect();
        for sup in supertypes {
            if let Some(parent) = self.klasses.get_mut(&sup) {
                parent.children.push(info.name.clone());
            }
        }
        self.klasses.insert(info.name.clone(), info);
        self.add(ty);
    }

    /// Add an interface to an already registered klass.
    pub fn add_interface(&mut self, klass: &str, interface: &str) {
        if let Some(info) = self.klasses.get_mut(klass) {
            if info.interfaces.iter().any(|i| i == interface) {
                return;
            }
            info.interfaces.push(interface.to_string());
        }
        if let Some(iface) = self.klasses.get_mut(interface) {
            iface.children.push(klass.to_string());
        }
    }

    // -- Transactions -------------------------------------------------------

    pub fn checkpoint(&self) -> TypeListMark {
        TypeListMark(self.types.len())
    }

    /// Forget every type registered after `mark`.
    pub fn rollback(&mut self, mark: TypeListMark) {
        if mark.0 >= self.types.len() {
            return;
        }
        let removed: Vec<Type> = self.types.drain(mark.0..).collect();
        let mut removed_klasses: Vec<String> = Vec::new();
        for ty in removed {
            self.index.remove(&ty);
            if let Type::Klass(name) = ty {
                self.klasses.remove(&name);
                removed_klasses.push(name);
            }
        }
        if removed_klasses.is_empty() {
            return;
        }
        for info in self.klasses.values_mut() {
            info.children.retain(|c| !removed_klasses.contains(c));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_and_roots_are_preregistered() {
        let list = TypeList::new();
        let all = list.get_all();
        assert!(all.contains(&Type::INT));
        assert!(all.contains(&Type::BOOLEAN));
        assert!(all.contains(&Type::object()));
        assert!(all.contains(&Type::string()));
        assert!(!all.contains(&Type::VOID));
        assert!(list.contains(&Type::VOID));
    }

    #[test]
    fn add_is_idempotent() {
        let mut list = TypeList::new();
        let before = list.get_all().len();
        list.add(Type::INT);
        list.add(Type::array_of(Type::INT, 2));
        list.add(Type::array_of(Type::INT, 2));
        assert_eq!(list.get_all().len(), before + 1);
    }

    #[test]
    fn find_fails_for_unknown_names() {
        let list = TypeList::new();
        assert_eq!(list.find("int").ok(), Some(Type::INT));
        let err = list.find("Nope").unwrap_err();
        assert!(!err.is_fatal());
    }

    #[test]
    fn builtin_int_set() {
        let list = TypeList::new();
        let ints = list.get_builtin_int();
        assert_eq!(ints.len(), 5);
        assert!(ints.contains(&Type::CHAR));
        assert!(list.is_builtin_int(&Type::LONG));
        assert!(!list.is_builtin_int(&Type::FLOAT));
        assert!(!list.is_builtin_int(&Type::BOOLEAN));
    }

    #[test]
    fn klass_registration_links_children() {
        let mut list = TypeList::new();
        list.add_klass(KlassInfo::new("A", Some(OBJECT.into()), KlassFlags::empty()));
        list.add_klass(KlassInfo::new("B", Some("A".into()), KlassFlags::empty()));
        assert_eq!(list.klass("A").map(|k| k.children.clone()), Some(vec!["B".to_string()]));
        assert_eq!(list.ancestors("B"), vec!["A".to_string(), OBJECT.to_string()]);
        assert!(list.is_subtype_of("B", "A"));
        assert!(!list.is_subtype_of("A", "B"));
    }

    #[test]
    fn interfaces_are_ancestors() {
        let mut list = TypeList::new();
        list.add_klass(KlassInfo::new("I", None, KlassFlags::INTERFACE));
        list.add_klass(KlassInfo::new("A", Some(OBJECT.into()), KlassFlags::empty()));
        list.add_interface("A", "I");
        assert!(list.is_subtype_of("A", "I"));
        assert!(list.ancestors("A").contains(&"I".to_string()));
    }

    #[test]
    fn rollback_removes_klasses_and_child_links() {
        let mut list = TypeList::new();
        list.add_klass(KlassInfo::new("A", Some(OBJECT.into()), KlassFlags::empty()));
        let mark = list.checkpoint();
        list.add_klass(KlassInfo::new("B", Some("A".into()), KlassFlags::empty()));
        list.add(Type::array_of(Type::klass("B"), 1));
        list.rollback(mark);
        assert!(list.klass("B").is_none());
        assert!(!list.contains(&Type::array_of(Type::klass("B"), 1)));
        assert!(list.klass("A").is_some_and(|a| a.children.is_empty()));
        assert_eq!(list.checkpoint(), mark);
    }
}
