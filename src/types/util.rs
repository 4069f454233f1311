//! Castability relations between types.
//!
//! These mirror Java's assignment (implicit) and cast (explicit)
//! conversions. Generated code only compiles if they are exact, so the
//! rules are intentionally conservative where Java is lenient (no boxing,
//! no constant narrowing).

use super::{Type, TypeList};

/// Identity or widening conversion from `from` to `to`.
pub fn can_implicitly_cast(from: &Type, to: &Type, types: &TypeList) -> bool {
    if from == to {
        return !from.is_void();
    }
    match (from, to) {
        (Type::BuiltIn(f), Type::BuiltIn(t)) => f.can_widen_to(*t),
        (Type::BuiltIn(_), _) | (_, Type::BuiltIn(_)) => false,
        (_, t) if t.is_object() => true,
        (Type::Klass(f), Type::Klass(t)) => types.is_subtype_of(f, t),
        (Type::Array(f), Type::Array(t)) => {
            if f.dimensions == t.dimensions {
                f.element.is_reference()
                    && t.element.is_reference()
                    && can_implicitly_cast(&f.element, &t.element, types)
            } else {
                // T[][] widens to Object[] since T[] is an Object.
                f.dimensions > t.dimensions && t.element.is_object()
            }
        }
        (Type::Klass(_), Type::Array(_)) | (Type::Array(_), Type::Klass(_)) => false,
    }
}

/// Conversion allowed by a cast expression `(to) from`.
pub fn can_explicitly_cast(from: &Type, to: &Type, types: &TypeList) -> bool {
    if from.is_void() || to.is_void() {
        return false;
    }
    match (from, to) {
        (Type::BuiltIn(f), Type::BuiltIn(t)) => f == t || (f.is_numeric() && t.is_numeric()),
        (Type::BuiltIn(_), _) | (_, Type::BuiltIn(_)) => false,
        _ if can_implicitly_cast(from, to, types) || can_implicitly_cast(to, from, types) => true,
        (Type::Klass(f), Type::Klass(t)) => {
            let (Some(fi), Some(ti)) = (types.klass(f), types.klass(t)) else {
                return false;
            };
            match (fi.is_interface(), ti.is_interface()) {
                (true, true) => true,
                (true, false) => !ti.is_final(),
                (false, true) => !fi.is_final(),
                (false, false) => false,
            }
        }
        _ => false,
    }
}

/// Candidates that implicitly convert to `target`.
pub fn get_implicitly_castable(candidates: &[Type], target: &Type, types: &TypeList) -> Vec<Type> {
    candidates
        .iter()
        .filter(|c| can_implicitly_cast(c, target, types))
        .cloned()
        .collect()
}

/// Candidates that can be cast to `target` with an explicit cast.
pub fn get_explicitly_castable(candidates: &[Type], target: &Type, types: &TypeList) -> Vec<Type> {
    candidates
        .iter()
        .filter(|c| can_explicitly_cast(c, target, types))
        .cloned()
        .collect()
}

/// Numeric built-ins whose capacity rank is at most that of `target`.
pub fn get_less_capacious_or_equal_than(candidates: &[Type], target: &Type) -> Vec<Type> {
    let Some(limit) = target.as_builtin().and_then(|b| b.rank()) else {
        return Vec::new();
    };
    candidates
        .iter()
        .filter(|c| {
            c.as_builtin()
                .and_then(|b| b.rank())
                .is_some_and(|rank| rank <= limit)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{KlassFlags, KlassInfo, OBJECT};

    fn hierarchy() -> TypeList {
        let mut list = TypeList::new();
        list.add_klass(KlassInfo::new("I", None, KlassFlags::INTERFACE));
        list.add_klass(KlassInfo::new("A", Some(OBJECT.into()), KlassFlags::empty()));
        list.add_klass(KlassInfo::new("B", Some("A".into()), KlassFlags::empty()));
        list.add_klass(KlassInfo::new("F", Some(OBJECT.into()), KlassFlags::FINAL));
        list.add_interface("B", "I");
        list
    }

    #[test]
    fn numeric_widening_subset() {
        let list = TypeList::new();
        let all = list.get_builtin();
        let into_int = get_implicitly_castable(&all, &Type::INT, &list);
        assert_eq!(into_int, vec![Type::BYTE, Type::CHAR, Type::SHORT, Type::INT]);
        let into_char = get_implicitly_castable(&all, &Type::CHAR, &list);
        assert_eq!(into_char, vec![Type::CHAR]);
        let into_bool = get_implicitly_castable(&all, &Type::BOOLEAN, &list);
        assert_eq!(into_bool, vec![Type::BOOLEAN]);
    }

    #[test]
    fn explicit_numeric_casts_are_total() {
        let list = TypeList::new();
        let all = list.get_builtin();
        let into_byte = get_explicitly_castable(&all, &Type::BYTE, &list);
        assert!(into_byte.contains(&Type::DOUBLE));
        assert!(into_byte.contains(&Type::CHAR));
        assert!(!into_byte.contains(&Type::BOOLEAN));
        assert!(!can_explicitly_cast(&Type::BOOLEAN, &Type::INT, &list));
        assert!(can_explicitly_cast(&Type::BOOLEAN, &Type::BOOLEAN, &list));
    }

    #[test]
    fn reference_widening_follows_hierarchy() {
        let list = hierarchy();
        let (a, b, i) = (Type::klass("A"), Type::klass("B"), Type::klass("I"));
        assert!(can_implicitly_cast(&b, &a, &list));
        assert!(can_implicitly_cast(&b, &i, &list));
        assert!(can_implicitly_cast(&b, &Type::object(), &list));
        assert!(!can_implicitly_cast(&a, &b, &list));
        assert!(can_explicitly_cast(&a, &b, &list));
        assert!(!can_implicitly_cast(&Type::INT, &Type::object(), &list));
    }

    #[test]
    fn interface_casts_respect_final() {
        let list = hierarchy();
        let (a, f, i) = (Type::klass("A"), Type::klass("F"), Type::klass("I"));
        assert!(can_explicitly_cast(&a, &i, &list));
        assert!(can_explicitly_cast(&i, &a, &list));
        assert!(!can_explicitly_cast(&f, &i, &list));
        assert!(!can_explicitly_cast(&Type::string(), &i, &list));
    }

    #[test]
    fn array_widening() {
        let list = hierarchy();
        let b_arr = Type::array_of(Type::klass("B"), 1);
        let a_arr = Type::array_of(Type::klass("A"), 1);
        let int_arr = Type::array_of(Type::INT, 1);
        let long_arr = Type::array_of(Type::LONG, 1);
        assert!(can_implicitly_cast(&b_arr, &a_arr, &list));
        assert!(!can_implicitly_cast(&a_arr, &b_arr, &list));
        assert!(!can_implicitly_cast(&int_arr, &long_arr, &list));
        assert!(can_implicitly_cast(&int_arr, &Type::object(), &list));
        let int2 = Type::array_of(Type::INT, 2);
        let obj1 = Type::array_of(Type::object(), 1);
        assert!(can_implicitly_cast(&int2, &obj1, &list));
    }

    #[test]
    fn capacity_filters() {
        let list = TypeList::new();
        let ints = list.get_builtin_int();
        let for_short = get_less_capacious_or_equal_than(&ints, &Type::SHORT);
        assert_eq!(for_short, vec![Type::BYTE, Type::CHAR, Type::SHORT]);
        let for_int = get_less_capacious_or_equal_than(&ints, &Type::INT);
        assert!(!for_int.contains(&Type::LONG));
        assert!(get_less_capacious_or_equal_than(&ints, &Type::BOOLEAN).is_empty());
    }
}
