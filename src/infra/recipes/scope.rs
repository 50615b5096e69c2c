use mongodb::bson::{doc, oid::ObjectId, Document};

/// Verified identity of the caller. Built only by the request guard from the
/// gateway-supplied header, never from a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner(ObjectId);

impl Owner {
    pub fn new(id: ObjectId) -> Self {
        Owner(id)
    }

    pub fn id(&self) -> ObjectId {
        self.0
    }

    pub fn filter(&self) -> Document {
        doc! { "userId": self.0 }
    }
}

/// Selector for a single recipe owned by the caller. Every read and write of
/// a recipe goes through one of these; there is no unscoped lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipeScope {
    recipe_id: ObjectId,
    owner: Owner,
}

impl RecipeScope {
    pub fn new(recipe_id: ObjectId, owner: &Owner) -> Self {
        RecipeScope {
            recipe_id,
            owner: *owner,
        }
    }

    pub fn recipe_id(&self) -> ObjectId {
        self.recipe_id
    }

    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    pub fn filter(&self) -> Document {
        doc! { "_id": self.recipe_id, "userId": self.owner.id() }
    }

    pub fn matches(&self, id: Option<ObjectId>, user_id: ObjectId) -> bool {
        id == Some(self.recipe_id) && user_id == self.owner.id()
    }
}
