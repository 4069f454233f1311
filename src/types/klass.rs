use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::Type;

pub type InterfaceVec = SmallVec<[String; 2]>;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct KlassFlags: u8 {
        const ABSTRACT = 1 << 0;
        const FINAL = 1 << 1;
        const INTERFACE = 1 << 2;
    }
}

/// Registry entry for a class or interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KlassInfo {
    pub name: String,
    /// `None` only for the root object type. Interfaces without a
    /// super-interface have `None` as well.
    pub parent: Option<String>,
    pub interfaces: InterfaceVec,
    pub children: Vec<String>,
    pub flags: KlassFlags,
}

impl KlassInfo {
    pub fn new(name: impl Into<String>, parent: Option<String>, flags: KlassFlags) -> Self {
        Self {
            name: name.into(),
            parent,
            interfaces: InterfaceVec::new(),
            children: Vec::new(),
            flags,
        }
    }

    pub fn is_abstract(&self) -> bool {
        self.flags.intersects(KlassFlags::ABSTRACT | KlassFlags::INTERFACE)
    }

    pub fn is_final(&self) -> bool {
        self.flags.contains(KlassFlags::FINAL)
    }

    pub fn is_interface(&self) -> bool {
        self.flags.contains(KlassFlags::INTERFACE)
    }

    pub fn as_type(&self) -> Type {
        Type::Klass(self.name.clone())
    }

    /// Direct supertypes: the parent followed by implemented interfaces.
    pub fn supertypes(&self) -> impl Iterator<Item = &String> {
        self.parent.iter().chain(self.interfaces.iter())
    }
}
