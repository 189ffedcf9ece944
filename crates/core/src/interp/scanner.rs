//! Content scanner - a cursor over one nesting level of a content tree.
//!
//! A root scanner walks a page or form sequence. When the current object is a
//! composite, `child_level` opens a scanner over its children whose state is
//! a value copy of the parent's state at that point. Children borrow their
//! parent, so the parent cannot advance while a child is alive.
//!
//! `move_next` applies the current object to the level's state and then
//! advances; wrappers built on the current object therefore see the state in
//! effect *before* that object runs.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::ops::Deref;
use std::sync::LazyLock;

use smallvec::SmallVec;
use smol_str::SmolStr;
use tracing::{debug, warn};

use crate::interp::device::Surface;
use crate::interp::executor::{Executor, PathBuilder, RenderSession, may_enter_form};
use crate::model::context::{ContentContext, FormXObject, Page, Resources, XObject};
use crate::model::objects::{CompositeKind, ContentObject, Operation};
use crate::model::state::{GraphicsState, compute_initial_ctm};
use crate::params::ScanParams;
use crate::utils::{MATRIX_IDENTITY, Matrix, Rect, Size, bbox2str, matrix2str, mult_matrix};
use crate::wrapper::GraphicsObjectWrapper;

/// Cursor position before the first object.
pub const START_INDEX: isize = -1;

static EMPTY_RESOURCES: LazyLock<Resources> = LazyLock::new(Resources::default);

/// Hook run on the level state each time a scan (re)starts.
pub type StartHook<'a> = Box<dyn FnMut(&mut GraphicsState) + 'a>;

#[derive(Clone, Copy)]
enum Sequence<'a> {
    /// Read-only objects (forms, caller-owned slices)
    Shared(&'a [ContentObject]),
    /// Page sequence open for editing, addressed through the level path
    Editable(&'a RefCell<Vec<ContentObject>>),
}

/// Content object at a scanner cursor.
///
/// Objects of an editable page stay borrowed while this is alive; drop it
/// before editing.
pub enum ContentRef<'a> {
    Borrowed(&'a ContentObject),
    Guarded(Ref<'a, ContentObject>),
}

impl Deref for ContentRef<'_> {
    type Target = ContentObject;

    fn deref(&self) -> &ContentObject {
        match self {
            Self::Borrowed(object) => object,
            Self::Guarded(object) => object,
        }
    }
}

impl fmt::Debug for ContentRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

/// What a child level scans the inside of.
#[derive(Debug, Clone)]
pub enum Container<'a> {
    Composite(CompositeKind),
    Form {
        name: SmolStr,
        form: &'a FormXObject,
    },
}

impl Container<'_> {
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Composite(CompositeKind::Text))
    }
}

fn resolve<'s>(mut objects: &'s [ContentObject], path: &[usize]) -> &'s [ContentObject] {
    for &i in path {
        match objects.get(i) {
            Some(ContentObject::Composite(composite)) => objects = &composite.objects,
            _ => return &[],
        }
    }
    objects
}

fn resolve_mut<'s>(
    mut objects: &'s mut Vec<ContentObject>,
    path: &[usize],
) -> Option<&'s mut Vec<ContentObject>> {
    for &i in path {
        match objects.get_mut(i) {
            Some(ContentObject::Composite(composite)) => objects = &mut composite.objects,
            _ => return None,
        }
    }
    Some(objects)
}

/// Root CTM and canvas used outside of `render`.
fn dry_device(context: &dyn ContentContext, params: &ScanParams) -> (Matrix, Size) {
    match params.canvas_size {
        Some(canvas) if !context.is_form() => (
            compute_initial_ctm(context.rotation(), context.content_box(), canvas),
            canvas,
        ),
        _ => (MATRIX_IDENTITY, context.size()),
    }
}

/// Scanner over one level of a content tree.
pub struct ContentScanner<'a, 'p> {
    context: &'a dyn ContentContext,
    resources: &'a Resources,
    params: ScanParams,
    sequence: Sequence<'a>,
    /// Composite indices leading from the editable root to this level
    path: SmallVec<[usize; 8]>,
    index: isize,
    state: GraphicsState,
    /// Parent state at spawn time; None for root levels
    seed: Option<GraphicsState>,
    preserve_text_state: bool,
    in_text: bool,
    parent: Option<&'p ContentScanner<'a, 'p>>,
    container: Option<Container<'a>>,
    depth: usize,
    path_buffer: PathBuilder,
    forms: Vec<SmolStr>,
    on_start: Option<StartHook<'a>>,
}

impl<'a, 'p> ContentScanner<'a, 'p> {
    fn root(context: &'a dyn ContentContext, sequence: Sequence<'a>, params: ScanParams) -> Self {
        let (initial_ctm, canvas) = dry_device(context, &params);
        let mut scanner = Self {
            context,
            resources: context.resources().unwrap_or(&EMPTY_RESOURCES),
            params,
            sequence,
            path: SmallVec::new(),
            index: START_INDEX,
            state: GraphicsState::new(initial_ctm, canvas),
            seed: None,
            preserve_text_state: false,
            in_text: false,
            parent: None,
            container: None,
            depth: 0,
            path_buffer: PathBuilder::default(),
            forms: Vec::new(),
            on_start: None,
        };
        scanner.move_start();
        scanner
    }

    /// Root scanner over a read-only sequence belonging to `context`.
    pub fn new(
        context: &'a dyn ContentContext,
        contents: &'a [ContentObject],
        params: ScanParams,
    ) -> Self {
        Self::root(context, Sequence::Shared(contents), params)
    }

    /// Root scanner over a page; the page sequence is editable.
    pub fn for_page(page: &'a Page, params: ScanParams) -> Self {
        Self::root(page, Sequence::Editable(&page.contents), params)
    }

    /// Root scanner over a form's own content (identity CTM).
    pub fn for_form(form: &'a FormXObject, params: ScanParams) -> Self {
        Self::root(form, Sequence::Shared(&form.contents), params)
    }

    fn spawn(
        &self,
        context: &'a dyn ContentContext,
        resources: &'a Resources,
        sequence: Sequence<'a>,
        path: SmallVec<[usize; 8]>,
        container: Container<'a>,
        forms: Vec<SmolStr>,
        on_start: Option<StartHook<'a>>,
    ) -> ContentScanner<'a, '_> {
        let depth = self.depth + 1;
        let in_text = self.in_text || container.is_text();
        let mut child = ContentScanner {
            context,
            resources,
            params: self.params.clone(),
            sequence,
            path,
            index: START_INDEX,
            state: self.state.clone_independent(depth),
            seed: Some(self.state.clone()),
            preserve_text_state: self.in_text,
            in_text,
            parent: Some(self),
            container: Some(container),
            depth,
            path_buffer: PathBuilder::default(),
            forms,
            on_start,
        };
        child.move_start();
        child
    }

    /// Scanner over the composite at the cursor; None for leaves and when
    /// there is no current object.
    pub fn child_level(&self) -> Option<ContentScanner<'a, '_>> {
        let index = usize::try_from(self.index).ok()?;
        let (sequence, path, kind) = match self.sequence {
            Sequence::Shared(objects) => match resolve(objects, &self.path).get(index)? {
                ContentObject::Composite(composite) => (
                    Sequence::Shared(composite.objects.as_slice()),
                    SmallVec::new(),
                    composite.kind.clone(),
                ),
                ContentObject::Leaf(_) => return None,
            },
            Sequence::Editable(cell) => {
                let objects = cell.borrow();
                match resolve(&objects, &self.path).get(index)? {
                    ContentObject::Composite(composite) => {
                        let mut path = self.path.clone();
                        path.push(index);
                        (Sequence::Editable(cell), path, composite.kind.clone())
                    }
                    ContentObject::Leaf(_) => return None,
                }
            }
        };
        Some(self.spawn(
            self.context,
            self.resources,
            sequence,
            path,
            Container::Composite(kind),
            self.forms.clone(),
            None,
        ))
    }

    /// Scanner over the form XObject invoked at the cursor.
    ///
    /// The form's matrix is concatenated onto the inherited CTM whenever the
    /// child (re)starts. None for anything but a `Do` naming a form, and for
    /// invocations refused by the recursion guard.
    pub fn for_xobject(&self) -> Option<ContentScanner<'a, '_>> {
        let name = match self.current()?.as_leaf()? {
            Operation::PaintXObject(name) => name.clone(),
            _ => return None,
        };
        let resources: &'a Resources = self.resources;
        let Some(XObject::Form(form)) = resources.xobject(&name) else {
            return None;
        };
        if !may_enter_form(&self.forms, &name, self.params.max_form_depth) {
            return None;
        }

        let mut forms = self.forms.clone();
        forms.push(name.clone());
        let matrix = form.matrix;
        debug!(form = %name, matrix = %matrix2str(matrix), "open form level");
        let hook: StartHook<'a> = Box::new(move |state: &mut GraphicsState| {
            state.ctm = mult_matrix(matrix, state.ctm);
        });
        Some(self.spawn(
            form,
            form.resources.as_deref().unwrap_or(resources),
            Sequence::Shared(&form.contents),
            SmallVec::new(),
            Container::Form { name, form },
            forms,
            Some(hook),
        ))
    }

    /// Registers the scan-start hook and restarts the level so it applies.
    pub fn set_on_start(&mut self, hook: StartHook<'a>) {
        self.on_start = Some(hook);
        self.move_start();
    }

    /// Object at the cursor; None before the first and after the last object.
    pub fn current(&self) -> Option<ContentRef<'a>> {
        let index = usize::try_from(self.index).ok()?;
        match self.sequence {
            Sequence::Shared(objects) => resolve(objects, &self.path)
                .get(index)
                .map(ContentRef::Borrowed),
            Sequence::Editable(cell) => {
                let path = &self.path;
                Ref::filter_map(cell.borrow(), |objects| resolve(objects, path).get(index))
                    .ok()
                    .map(ContentRef::Guarded)
            }
        }
    }

    /// Wrapper over the object at the cursor, if it is a graphics object.
    pub fn current_wrapper(&self) -> Option<GraphicsObjectWrapper<'a>> {
        GraphicsObjectWrapper::get(self)
    }

    pub fn index(&self) -> isize {
        self.index
    }

    /// Number of objects at this level.
    pub fn len(&self) -> usize {
        match self.sequence {
            Sequence::Shared(objects) => resolve(objects, &self.path).len(),
            Sequence::Editable(cell) => resolve(&cell.borrow(), &self.path).len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Moves before the first object and re-initializes the level state.
    pub fn move_start(&mut self) {
        self.index = START_INDEX;
        self.path_buffer.clear();
        match &self.seed {
            None => self.state.reset(),
            Some(seed) => seed.copy_into(&mut self.state, self.preserve_text_state),
        }
        if let Some(hook) = self.on_start.as_mut() {
            hook(&mut self.state);
        }
    }

    /// Applies the current object, then advances. Returns whether there is a
    /// current object afterwards.
    pub fn move_next(&mut self) -> bool {
        self.advance(None)
    }

    fn advance(&mut self, session: Option<&mut RenderSession<'_>>) -> bool {
        let len = self.len();
        if let Some(object) = self.current() {
            let mut executor = Executor::new(
                self.resources,
                &self.params,
                &mut self.forms,
                &mut self.path_buffer,
                session,
            );
            executor.execute(&mut self.state, &object);
        }
        if self.index < len as isize {
            self.index += 1;
        }
        self.current().is_some()
    }

    pub fn move_first(&mut self) -> bool {
        self.move_start();
        self.move_next()
    }

    pub fn move_last(&mut self) -> bool {
        let last = self.len() as isize - 1;
        self.move_to(last)
    }

    /// Moves past the last object, applying everything on the way.
    pub fn move_end(&mut self) {
        while self.move_next() {}
    }

    /// Moves to `index`, restarting when it lies behind the cursor.
    pub fn move_to(&mut self, index: isize) -> bool {
        if index < self.index {
            self.move_start();
        }
        while self.index < index {
            if !self.move_next() {
                break;
            }
        }
        self.current().is_some()
    }

    // ========================================================================
    // Editing
    // ========================================================================

    fn objects_mut(&self) -> RefMut<'a, Vec<ContentObject>> {
        let Sequence::Editable(cell) = self.sequence else {
            panic!("content sequence is read-only");
        };
        let path = &self.path;
        match RefMut::filter_map(cell.borrow_mut(), |objects| resolve_mut(objects, path)) {
            Ok(objects) => objects,
            Err(_) => panic!("scan level no longer matches the content tree"),
        }
    }

    /// Inserts `object` at the cursor and leaves the cursor on it.
    ///
    /// # Panics
    /// Panics on read-only sequences.
    pub fn insert(&mut self, object: ContentObject) {
        if self.index == START_INDEX {
            self.index = 0;
        }
        let index = self.index as usize;
        self.objects_mut().insert(index, object);
    }

    /// Inserts `objects` in order at the cursor, applying each but the last.
    /// The cursor ends on the last inserted object.
    ///
    /// # Panics
    /// Panics on read-only sequences.
    pub fn insert_all<I: IntoIterator<Item = ContentObject>>(&mut self, objects: I) {
        let mut first = true;
        for object in objects {
            if !first {
                self.move_next();
            }
            self.insert(object);
            first = false;
        }
    }

    /// Removes and returns the current object; the cursor keeps its index.
    ///
    /// # Panics
    /// Panics when there is no current object or the sequence is read-only.
    pub fn remove(&mut self) -> ContentObject {
        assert!(
            self.index >= 0 && (self.index as usize) < self.len(),
            "remove called without a current object"
        );
        let index = self.index as usize;
        self.objects_mut().remove(index)
    }

    /// Replaces the current object, returning the previous one.
    ///
    /// # Panics
    /// Panics when there is no current object or the sequence is read-only.
    pub fn replace_current(&mut self, object: ContentObject) -> ContentObject {
        assert!(
            self.index >= 0 && (self.index as usize) < self.len(),
            "replace_current called without a current object"
        );
        let index = self.index as usize;
        std::mem::replace(&mut self.objects_mut()[index], object)
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Renders the whole level onto `surface`.
    ///
    /// The surface is cleared (unless disabled in the params) and clipped to
    /// the canvas or `clip`, then every object is drawn in order. Afterwards
    /// the level is back at its start with its dry-scan device mapping, also
    /// when a surface call unwinds.
    ///
    /// # Panics
    /// Panics when called on a child level.
    pub fn render(&mut self, surface: &mut dyn Surface, canvas_size: Size, clip: Option<Rect>) {
        assert!(self.is_root_level(), "render is only available on root levels");
        let canvas: Rect = (0.0, 0.0, canvas_size.0, canvas_size.1);
        debug!(
            width = canvas_size.0,
            height = canvas_size.1,
            clip = %bbox2str(clip.unwrap_or(canvas)),
            "render content"
        );

        if self.params.clear_surface {
            surface.clear(canvas);
        }
        surface.clip_rect(clip.unwrap_or(canvas));

        let initial_ctm = if self.context.is_form() {
            MATRIX_IDENTITY
        } else {
            compute_initial_ctm(self.context.rotation(), self.context.content_box(), canvas_size)
        };
        let mut level = DryMapping::enter(self, initial_ctm, canvas_size);
        surface.set_matrix(initial_ctm);

        let mut session = RenderSession::new(surface, canvas_size);
        while level.scanner.advance(Some(&mut session)) {}
        if level.scanner.path_buffer.pending_clip.is_some() {
            warn!("content ended with an unpainted clip path");
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn parent_level(&self) -> Option<&'p ContentScanner<'a, 'p>> {
        self.parent
    }

    pub fn root_level(&self) -> &ContentScanner<'a, 'p> {
        let mut level = self;
        while let Some(parent) = level.parent {
            level = parent;
        }
        level
    }

    pub fn is_root_level(&self) -> bool {
        self.parent.is_none()
    }

    /// Graphics state in effect before the current object.
    pub fn state(&self) -> &GraphicsState {
        &self.state
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// None for root levels.
    pub fn container(&self) -> Option<&Container<'a>> {
        self.container.as_ref()
    }

    pub fn context(&self) -> &'a dyn ContentContext {
        self.context
    }

    pub fn resources(&self) -> &'a Resources {
        self.resources
    }

    pub fn params(&self) -> &ScanParams {
        &self.params
    }

    pub fn canvas_size(&self) -> Size {
        self.state.canvas_size
    }
}

/// Holds a root level in render space and puts back its dry-scan mapping
/// when dropped.
struct DryMapping<'s, 'a, 'p> {
    scanner: &'s mut ContentScanner<'a, 'p>,
    initial_ctm: Matrix,
    canvas_size: Size,
}

impl<'s, 'a, 'p> DryMapping<'s, 'a, 'p> {
    fn enter(
        scanner: &'s mut ContentScanner<'a, 'p>,
        initial_ctm: Matrix,
        canvas_size: Size,
    ) -> Self {
        let dry = (scanner.state.initial_ctm, scanner.state.canvas_size);
        scanner.state.reset_with(initial_ctm, canvas_size);
        scanner.move_start();
        Self {
            scanner,
            initial_ctm: dry.0,
            canvas_size: dry.1,
        }
    }
}

impl Drop for DryMapping<'_, '_, '_> {
    fn drop(&mut self) {
        self.scanner.state.reset_with(self.initial_ctm, self.canvas_size);
        self.scanner.move_start();
    }
}

impl fmt::Debug for ContentScanner<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentScanner")
            .field("depth", &self.depth)
            .field("index", &self.index)
            .field("container", &self.container)
            .finish_non_exhaustive()
    }
}
