pub mod books;

use std::sync::Arc;

use bookshelf_kernel::settings::Settings;
use bookshelf_kernel::ModuleRegistry;

use books::store::BookStore;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, store: Arc<dyn BookStore>, settings: &Settings) {
    registry.register(books::create_module(store, &settings.books));
}
