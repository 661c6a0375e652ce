use rustc_hash::FxHashMap;
use std::{cell::RefCell, hash::Hash, marker::PhantomData};
use typed_arena::Arena;

/// An arena that hash-conses its contents. Interning the same data twice
/// returns the same handle, so handle identity is structural identity.
pub struct InternedArena<Data, Handle> {
    arena: Arena<Data>,
    cache: RefCell<FxHashMap<Data, Handle>>,
    handle: PhantomData<Handle>,
}

impl<'ctx, Data, Handle> InternedArena<Data, Handle> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            cache: RefCell::new(FxHashMap::default()),
            handle: PhantomData,
        }
    }

    pub fn intern(&'ctx self, data: Data) -> Handle
    where
        Data: Hash + Eq + Clone,
        Handle: InternerHandle<'ctx, Data> + Copy,
    {
        if let Some(handle) = self.cache.borrow().get(&data) {
            return *handle;
        }

        let ptr = self.arena.alloc(data.clone());
        let handle = InternerHandle::from_ref(ptr);
        self.cache.borrow_mut().insert(data, handle);
        handle
    }
}

impl<Data, Handle> Default for InternedArena<Data, Handle> {
    fn default() -> Self {
        Self::new()
    }
}

pub trait InternerHandle<'ctx, Data> {
    fn from_ref(r: &'ctx Data) -> Self;
}

/// Declares a `Copy` handle to arena data whose equality, ordering and hash
/// are by address. Only sound for data allocated in an `InternedArena`.
#[macro_export]
macro_rules! generate_arena_handle {
    ($handle:ident<$ctx:lifetime> => $data:ty) => {
        #[derive(std::clone::Clone, std::marker::Copy, std::cmp::Eq)]
        pub struct $handle<$ctx>(pub &$ctx $data);

        impl<$ctx> std::cmp::PartialEq for $handle<$ctx> {
            fn eq(&self, other: &Self) -> bool {
                std::ptr::addr_eq(self.0, other.0)
            }
        }

        impl<$ctx> std::cmp::PartialOrd for $handle<$ctx> {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl<$ctx> std::cmp::Ord for $handle<$ctx> {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                (self.0 as *const $data as usize).cmp(&(other.0 as *const $data as usize))
            }
        }

        impl<$ctx> std::hash::Hash for $handle<$ctx> {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                std::ptr::hash(self.0, state);
            }
        }

        impl<$ctx> std::ops::Deref for $handle<$ctx> {
            type Target = $data;

            fn deref(&self) -> &$ctx Self::Target {
                self.0
            }
        }

        impl<$ctx> $crate::context::arena::InternerHandle<$ctx, $data> for $handle<$ctx> {
            fn from_ref(r: &$ctx $data) -> Self {
                Self(r)
            }
        }
    };
}
